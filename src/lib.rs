//! ポケポケ デッキビルダー
//!
//! デッキのレシピ・回し方・強み/弱みを JSON ファイル1つで管理する。

pub mod cli;
pub mod config;
pub mod deck;
pub mod formatter;
pub mod logging;

pub use deck::{Deck, DeckBook, DeckError, DeckMap, DeckStore, DeckType};
