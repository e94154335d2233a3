use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::deck::{CardEntry, Deck, DeckType, Difficulty, Label, Recipe, Tier};

#[derive(Parser)]
#[command(name = "pokedeck", version, about = "ポケポケ デッキビルダー")]
pub struct Args {
    /// Deck store (JSON). Overrides POKEDECK_STORE and the config file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Treat a corrupt or unreadable store as empty
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Directory holding config.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List decks, optionally only one type
    List {
        /// 炎 / fire など。知らないタイプ名は綴りで比べる
        #[arg(long = "type")]
        deck_type: Option<String>,
    },
    /// Show recipe, phases, strengths and weaknesses of a deck
    Show { name: String },
    /// Add a new deck
    Add {
        name: String,
        #[command(flatten)]
        fields: DeckFields,
    },
    /// Delete a deck
    Remove {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show which types are in the store
    Types,
    /// Line-based interactive mode
    Interactive,
    /// Show the resolved configuration
    Config {
        /// Write a default config.json if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct DeckFields {
    /// 炎, 水, 草, 雷, 超, 闘, 悪, 鋼, 無色, ドラゴン (other text is stored as written)
    #[arg(long = "type")]
    pub deck_type: Option<Label<DeckType>>,
    /// 1-5 or ★★★
    #[arg(long)]
    pub difficulty: Option<Label<Difficulty>>,
    /// Tier1, Tier2, Tier3, 参考
    #[arg(long)]
    pub tier: Option<Label<Tier>>,
    /// NAME:COUNT, repeatable
    #[arg(long)]
    pub pokemon: Vec<CardEntry>,
    /// NAME:COUNT, repeatable
    #[arg(long)]
    pub trainer: Vec<CardEntry>,
    /// LABEL=TEXT, repeatable
    #[arg(long, value_parser = parse_phase)]
    pub phase: Vec<(String, String)>,
    #[arg(long)]
    pub strength: Vec<String>,
    #[arg(long)]
    pub weakness: Vec<String>,
    #[arg(long)]
    pub tips: Option<String>,
    /// Accent color, e.g. #EF4444
    #[arg(long)]
    pub color: Option<String>,
}

impl DeckFields {
    /// 回し方が未指定なら 序盤/中盤/終盤 を空で用意する
    pub fn into_deck(self, default_color: &str) -> Deck {
        let phases: IndexMap<String, String> = if self.phase.is_empty() {
            default_phases()
        } else {
            self.phase.into_iter().collect()
        };

        Deck {
            deck_type: self.deck_type,
            difficulty: self.difficulty,
            tier: self.tier,
            recipe: Recipe {
                pokemon: self.pokemon,
                trainer: self.trainer,
            },
            phases,
            strengths: non_blank(self.strength),
            weaknesses: non_blank(self.weakness),
            counter_tips: self.tips.unwrap_or_default(),
            accent_color: self.color.unwrap_or_else(|| default_color.to_string()),
            ..Deck::default()
        }
    }
}

pub fn default_phases() -> IndexMap<String, String> {
    ["序盤", "中盤", "終盤"]
        .into_iter()
        .map(|label| (label.to_string(), String::new()))
        .collect()
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_phase(s: &str) -> Result<(String, String), String> {
    let (label, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=TEXT, got '{s}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("phase label is empty in '{s}'"));
    }
    Ok((label.to_string(), text.trim().to_string()))
}
