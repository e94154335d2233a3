use env_logger::{Builder, Env};

/// -v の回数からログレベルを決める。RUST_LOG があればそちらが優先
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// ログ出力を初期化する。二度目以降の呼び出しは何もしない
pub fn init(verbose: u8) {
    let env = Env::default().default_filter_or(level_for(verbose));
    let _ = Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(3);
    }
}
