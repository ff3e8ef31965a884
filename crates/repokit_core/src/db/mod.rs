//! SQLite persistence context, bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Apply caller-provided schema migrations in deterministic order.
//! - Own the unit of work (`DbContext`) and per-entity collections.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Writes staged through a context stay invisible to other connections
//!   until `DbContext::save_changes` commits them.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod context;
pub mod migrations;
mod open;
mod options;
mod set;

pub use context::DbContext;
pub use migrations::Migration;
pub use open::{open_db, open_db_in_memory};
pub use options::ContextOptions;
pub use set::{quote_ident, EntitySet, Select};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidMigrationOrder {
        previous: u32,
        next: u32,
    },
    /// Update staged for an entity that has no key yet.
    MissingKey {
        table: &'static str,
    },
    /// Update matched no row: the row was removed or never stored.
    ConcurrencyConflict {
        table: &'static str,
        key: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidMigrationOrder { previous, next } => write!(
                f,
                "migration versions must be strictly increasing, got {next} after {previous}"
            ),
            Self::MissingKey { table } => {
                write!(f, "cannot update a `{table}` row without a key")
            }
            Self::ConcurrencyConflict { table, key } => write!(
                f,
                "update of `{table}` row {key} affected no rows; it may have been deleted"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidMigrationOrder { .. }
            | Self::MissingKey { .. }
            | Self::ConcurrencyConflict { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
