//! Key-value persistence capability.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the serialized note collection.
pub const NOTES_KEY: &str = "notes";
/// Storage key for the dark-mode display preference.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Error raised by a key-value backend.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite-backed storage failure.
    Db(DbError),
    /// Any other backend failure, described for diagnostics.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value store that survives process restarts.
///
/// Absent keys are reported as `Ok(None)` and mean "no prior state".
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
