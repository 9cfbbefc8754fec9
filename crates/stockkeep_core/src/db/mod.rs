//! Inventory store persistence: connection bootstrap, schema upgrades and
//! ownership of the live connection.
//!
//! # Responsibility
//! - Open the store file (or an in-memory store) ready for record access.
//! - Bring any older `products` layout up to the current schema.
//! - Keep the one live connection next to the file it belongs to.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - No connection leaves this module before migrations have succeeded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod handle;
pub mod migrations;
mod open;

pub use handle::StoreHandle;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or closing the store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The store path exists but is a directory or other non-file entry.
    NotAFile(PathBuf),
    /// The store was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::NotAFile(path) => {
                write!(f, "store path `{}` is not a regular file", path.display())
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than this build supports ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NotAFile(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
