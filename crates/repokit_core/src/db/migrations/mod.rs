//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Describe schema migrations as ordered `(version, sql)` pairs.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must be strictly increasing within one list.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step. Lists of migrations are applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub sql: &'static str,
}

impl Migration {
    pub const fn new(version: u32, sql: &'static str) -> Self {
        Self { version, sql }
    }
}

/// Schema for the bundled `ExampleEntity`.
pub const EXAMPLE_MIGRATIONS: &[Migration] =
    &[Migration::new(1, include_str!("0001_example_entities.sql"))];

/// Returns the latest version in `migrations`, or `0` for an empty list.
pub fn latest_version(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    check_order(migrations)?;

    let current_version = current_user_version(conn)?;
    let latest = latest_version(migrations);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut applied = 0usize;
    for migration in migrations
        .iter()
        .filter(|migration| migration.version > current_version)
    {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        applied += 1;
    }
    tx.commit()?;

    info!(
        "event=migrations_apply module=db status=ok from_version={} to_version={} applied={}",
        current_version, latest, applied
    );
    Ok(())
}

fn check_order(migrations: &[Migration]) -> DbResult<()> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(DbError::InvalidMigrationOrder {
                previous: pair[0].version,
                next: pair[1].version,
            });
        }
    }
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
