use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const STORE_ENV: &str = "POKEDECK_STORE";
pub const DEFAULT_STORE_FILE: &str = "decks.json";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub config_dir: PathBuf,
    /// デッキストアの場所。未指定ならカレントの decks.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    /// 壊れたストアを空として扱う
    #[serde(default)]
    pub lenient: bool,
    #[serde(default = "default_accent_color")]
    pub default_accent_color: String,
}

fn default_accent_color() -> String {
    "#3B82F6".to_string()
}

impl Config {
    pub fn new(config_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pokedeck")
        });

        let config_path = config_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default_config(config_dir));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        if config_str.trim().is_empty() {
            log::warn!("{} is empty, using defaults", config_path.display());
            return Ok(Self::default_config(config_dir));
        }

        let mut config: Config = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config.config_dir = config_dir;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)
            .context("Failed to create config directory")?;
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(self.config_file(), json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(config_dir: PathBuf) -> Self {
        Config {
            config_dir,
            store_file: None,
            lenient: false,
            default_accent_color: default_accent_color(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// --store > POKEDECK_STORE > config の store_file > ./decks.json
    pub fn store_path(&self, cli_store: Option<PathBuf>) -> PathBuf {
        self.resolve_store_path(cli_store, std::env::var_os(STORE_ENV).map(PathBuf::from))
    }

    fn resolve_store_path(&self, cli_store: Option<PathBuf>, env_store: Option<PathBuf>) -> PathBuf {
        cli_store
            .or(env_store.filter(|p| !p.as_os_str().is_empty()))
            .or_else(|| self.store_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }
}
