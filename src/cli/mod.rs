use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::deck::{DeckBook, DeckError, DeckStore, DeckType, Label};
use crate::formatter::DeckFormatter;

pub use commands::{Args, Commands, DeckFields};

mod commands;
pub mod interactive;

pub fn run(args: Args) -> Result<()> {
    let config = Config::new(args.config_dir.clone())?;

    if let Commands::Config { init } = args.command {
        return handle_config(&config, args.store, init);
    }

    let mut book = open_book(&config, args.store, args.lenient)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    match args.command {
        Commands::List { deck_type } => handle_list(&book, deck_type.as_deref(), &mut stdout),
        Commands::Show { name } => handle_show(&book, &name, &config, &mut stdout),
        Commands::Add { name, fields } => handle_add(&mut book, &name, fields, &config, &mut stdout),
        Commands::Remove { name, yes } => {
            handle_remove(&mut book, &name, yes, &mut stdin.lock(), &mut stdout)
        }
        Commands::Types => handle_types(&book, &mut stdout),
        Commands::Interactive => {
            interactive::Session::new(&mut book, &config, stdin.lock(), stdout).run()
        }
        Commands::Config { .. } => unreachable!("handled above"),
    }
}

/// ストアを開く。--lenient か config の lenient が立っていれば壊れたストアを空として扱う
///
/// その場合は読み取り専用で、追加・削除はエラーになる
pub fn open_book(config: &Config, store: Option<PathBuf>, lenient: bool) -> Result<DeckBook> {
    let store = DeckStore::new(config.store_path(store));
    log::debug!("using store {}", store.path().display());

    if lenient || config.lenient {
        Ok(DeckBook::open_lenient(store))
    } else {
        DeckBook::open(store).context("Failed to load decks")
    }
}

pub fn handle_list(book: &DeckBook, deck_type: Option<&str>, out: &mut impl Write) -> Result<()> {
    let names = book.filter_by_type(deck_type);
    match deck_type.and_then(|t| t.parse::<Label<DeckType>>().ok()) {
        Some(t) => {
            let emoji = t.known().map_or("🃏", DeckType::emoji);
            writeln!(out, "\n{} {}タイプのデッキ ({}件):", emoji, t, names.len())?
        }
        None => writeln!(out, "\n利用可能なデッキ一覧 ({}件):", names.len())?,
    }
    if book.is_fallback() {
        writeln!(out, "⚠️  ストアを読み込めなかったため空の一覧を表示しています（読み取り専用）。")?;
    }
    write!(out, "{}", DeckFormatter::format_list(book.decks(), &names))?;
    Ok(())
}

pub fn handle_show(book: &DeckBook, name: &str, config: &Config, out: &mut impl Write) -> Result<()> {
    let deck = book
        .get(name)
        .ok_or_else(|| DeckError::NotFound(name.to_string()))?;
    writeln!(
        out,
        "{}",
        DeckFormatter::format_detail(name, deck, &config.default_accent_color)
    )?;
    Ok(())
}

pub fn handle_add(
    book: &mut DeckBook,
    name: &str,
    fields: DeckFields,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let deck = fields.into_deck(&config.default_accent_color);
    book.add_deck(name, deck)?;
    writeln!(out, "✅ 「{}」デッキを追加・保存しました。", name.trim())?;
    Ok(())
}

pub fn handle_remove(
    book: &mut DeckBook,
    name: &str,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    if book.get(name).is_none() {
        return Err(DeckError::NotFound(name.to_string()).into());
    }

    if !yes {
        write!(
            out,
            "⚠️  「{}」を削除しますか？この操作は元に戻せません。 (y/n): ",
            name
        )?;
        out.flush()?;
        if !confirm(input)? {
            writeln!(out, "キャンセルしました。")?;
            return Ok(());
        }
    }

    book.remove_deck(name)?;
    writeln!(out, "🗑️  「{}」を削除しました。", name)?;
    Ok(())
}

pub fn handle_types(book: &DeckBook, out: &mut impl Write) -> Result<()> {
    let types = book.present_types();
    writeln!(out, "\n🔍 タイプ一覧:")?;
    write!(out, "{}", DeckFormatter::format_types(book.decks(), &types))?;
    Ok(())
}

fn handle_config(config: &Config, store: Option<PathBuf>, init: bool) -> Result<()> {
    if init {
        if config.config_file().exists() {
            println!("⚠️  {} は既に存在します。", config.config_file().display());
        } else {
            config.save()?;
            println!("✅ {} を作成しました。", config.config_file().display());
        }
    }

    println!("config file : {}", config.config_file().display());
    println!("store       : {}", config.store_path(store).display());
    println!("lenient     : {}", config.lenient);
    println!("accent color: {}", config.default_accent_color);
    Ok(())
}

/// y/yes なら true。EOF は no 扱い
pub(crate) fn confirm(input: &mut impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
