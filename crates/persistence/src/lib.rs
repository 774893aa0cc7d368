//! Session persistence
//!
//! A single JSON file maps session id to session record. The file is loaded
//! once at start and rewritten after each change through a temp file and an
//! atomic rename, so a crash never leaves a half-written store.
//!
//! Persistence never fails a turn:
//! - a missing or corrupt file loads as an empty store
//! - the first failed write is warned once, after which the store runs in
//!   memory only

mod store;

pub use store::JsonSessionStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Write task failed: {0}")]
    Task(String),
}

impl From<PersistenceError> for loan_assist_core::Error {
    fn from(err: PersistenceError) -> Self {
        loan_assist_core::Error::PersistenceUnavailable(err.to_string())
    }
}
