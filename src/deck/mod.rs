pub mod book;
pub mod error;
pub mod model;
pub mod ops;
pub mod store;

pub use book::DeckBook;
pub use error::{DeckError, Result};
pub use model::{CardEntry, Deck, DeckMap, DeckType, Difficulty, Label, Recipe, Tier, DECK_SIZE};
pub use ops::{add_deck, filter_by_type, present_types, remove_deck};
pub use store::DeckStore;
