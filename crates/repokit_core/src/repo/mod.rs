//! Repository layer: one generic repository over any `Entity`.
//!
//! # Responsibility
//! - Define the CRUD contract shared by every entity type.
//! - Apply soft-delete, localization and audit behavior from capabilities.
//! - Keep SQL composition inside the persistence boundary.
//!
//! # Invariants
//! - "Not found" is a normal outcome, never an error.
//! - Storage failures propagate unchanged as `RepoError::Db`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod generic_repo;
pub mod hooks;
pub mod include;
pub mod query;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for repository construction, persistence and hook failures.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// `Entity::CAPABILITIES` enables a capability whose accessor
    /// returns `None`.
    CapabilityMismatch {
        table: &'static str,
        capability: &'static str,
    },
    /// Raised by a save hook to abort or report a commit.
    Hook(String),
}

impl RepoError {
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::CapabilityMismatch { table, capability } => write!(
                f,
                "{table} declares capability {capability} but does not expose it"
            ),
            Self::Hook(message) => write!(f, "save hook failed: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::CapabilityMismatch { .. }
            | Self::Hook(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
