//! Unit of work over one SQLite connection.
//!
//! # Responsibility
//! - Stage writes inside a lazily opened transaction.
//! - Commit or roll back staged writes as one unit.
//! - Hand out typed per-entity collections.
//!
//! # Invariants
//! - A transaction is open exactly when the context has staged changes.
//! - The affected-row counter resets on every commit or rollback.
//! - Dropping a context with staged changes rolls them back.

use super::{DbResult, EntitySet};
use crate::model::entity::Entity;
use log::{debug, error, warn};
use rusqlite::Connection;
use std::cell::Cell;
use std::time::Instant;

/// Persistence context bound to one connection.
///
/// Not `Sync`: calls on one context must be serialized by the caller.
pub struct DbContext {
    conn: Connection,
    pending_rows: Cell<usize>,
}

impl DbContext {
    /// Wraps an already configured and migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            pending_rows: Cell::new(0),
        }
    }

    /// Raw connection access for include loaders and custom queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Typed collection for entity `E`.
    pub fn set<E: Entity>(&self) -> EntitySet<'_, E> {
        EntitySet::new(self)
    }

    /// Returns whether writes are staged but not yet committed.
    pub fn has_pending_changes(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Rows affected by staged writes since the last commit or rollback.
    pub fn pending_rows(&self) -> usize {
        self.pending_rows.get()
    }

    /// Commits staged writes and returns the number of affected rows.
    ///
    /// Returns `Ok(0)` without touching the database when nothing is staged.
    /// A failed commit rolls the transaction back before returning the error.
    pub fn save_changes(&self) -> DbResult<usize> {
        if !self.has_pending_changes() {
            self.pending_rows.set(0);
            return Ok(0);
        }

        let started_at = Instant::now();
        let affected = self.pending_rows.replace(0);
        match self.conn.execute_batch("COMMIT;") {
            Ok(()) => {
                debug!(
                    "event=save_changes module=db status=ok affected={} duration_ms={}",
                    affected,
                    started_at.elapsed().as_millis()
                );
                Ok(affected)
            }
            Err(err) => {
                error!(
                    "event=save_changes module=db status=error affected={} duration_ms={} error={}",
                    affected,
                    started_at.elapsed().as_millis(),
                    err
                );
                if self.has_pending_changes() {
                    if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK;") {
                        warn!(
                            "event=discard_changes module=db status=error error={}",
                            rollback_err
                        );
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Rolls back staged writes and returns how many rows they had touched.
    pub fn discard_changes(&self) -> DbResult<usize> {
        let discarded = self.pending_rows.replace(0);
        if !self.has_pending_changes() {
            return Ok(0);
        }

        self.conn.execute_batch("ROLLBACK;")?;
        debug!(
            "event=discard_changes module=db status=ok discarded={}",
            discarded
        );
        Ok(discarded)
    }

    pub(crate) fn begin_if_needed(&self) -> DbResult<()> {
        if self.conn.is_autocommit() {
            // SQLite may have rolled back on its own after a hard failure.
            self.pending_rows.set(0);
            self.conn.execute_batch("BEGIN DEFERRED;")?;
        }
        Ok(())
    }

    pub(crate) fn record_changes(&self, rows: usize) {
        self.pending_rows.set(self.pending_rows.get() + rows);
    }
}

impl Drop for DbContext {
    fn drop(&mut self) {
        if !self.has_pending_changes() {
            return;
        }
        warn!(
            "event=discard_changes module=db status=start reason=dropped pending_rows={}",
            self.pending_rows.get()
        );
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            error!(
                "event=discard_changes module=db status=error reason=dropped error={}",
                err
            );
        }
    }
}
