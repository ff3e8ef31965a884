//! Generic data-access layer over SQLite.
//! One repository type serves every entity; soft-delete, localization and
//! audit behavior come from the capabilities an entity declares.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{
    open_db, open_db_in_memory, ContextOptions, DbContext, DbError, DbResult, EntitySet,
    Migration, Select,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::entity::{Auditable, Capabilities, Entity, Localized, SoftDelete, Timestamp};
pub use model::example::ExampleEntity;
pub use repo::generic_repo::{CrudRepository, Repository};
pub use repo::hooks::SaveHooks;
pub use repo::include::{include, Include, IncludeWith};
pub use repo::query::{Filter, FilterValue, ListQuery, OrderBy, OrderDirection};
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
