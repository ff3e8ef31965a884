//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas from `ContextOptions`.
//! - Trigger schema migrations before handing out a usable context.
//!
//! # Invariants
//! - Returned contexts have migrations fully applied.
//! - Returned contexts start with no staged changes.

use super::migrations::{apply_migrations, Migration};
use super::{ContextOptions, DbContext, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(
    path: impl AsRef<Path>,
    options: &ContextOptions,
    migrations: &[Migration],
) -> DbResult<DbContext> {
    open_with("file", options, migrations, || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory(
    options: &ContextOptions,
    migrations: &[Migration],
) -> DbResult<DbContext> {
    open_with("memory", options, migrations, Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    options: &ContextOptions,
    migrations: &[Migration],
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<DbContext> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = bootstrap_connection(&mut conn, options, migrations) {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={} duration_ms={}",
        mode,
        started_at.elapsed().as_millis()
    );
    Ok(DbContext::new(conn))
}

fn bootstrap_connection(
    conn: &mut Connection,
    options: &ContextOptions,
    migrations: &[Migration],
) -> DbResult<()> {
    conn.execute_batch(options.pragma_sql())?;
    conn.busy_timeout(options.busy_timeout)?;
    apply_migrations(conn, migrations)?;
    Ok(())
}
