use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Deck name is empty")]
    EmptyName,

    #[error("Deck already exists: {0}")]
    DuplicateName(String),

    #[error("Deck not found: {0}")]
    NotFound(String),

    #[error("Store is corrupt ({}): {source}", path.display())]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read store ({}): {source}", path.display())]
    StoreReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write store ({}): {source}", path.display())]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store was not loaded ({}), refusing to overwrite it", path.display())]
    StoreNotLoaded { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, DeckError>;
