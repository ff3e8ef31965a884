//! Per-entity collection over one table.
//!
//! # Responsibility
//! - Compose parameterized SQL for one `Entity` type.
//! - Stage inserts/updates/deletes inside the owning context's transaction.
//!
//! # Invariants
//! - Identifiers are always quoted; values are always bound parameters.
//! - Every staged write records its affected row count on the context.

use super::{DbContext, DbError, DbResult};
use crate::model::entity::Entity;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, ToSql};
use std::marker::PhantomData;

/// Composed `SELECT` for `EntitySet::query`.
///
/// `conditions` are joined with `AND`; placeholders in them must be
/// anonymous (`?`) and `params` must list their values in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub conditions: Vec<String>,
    pub params: Vec<Value>,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Typed view of one table, borrowed from a `DbContext`.
pub struct EntitySet<'ctx, E> {
    ctx: &'ctx DbContext,
    _entity: PhantomData<fn() -> E>,
}

impl<'ctx, E: Entity> EntitySet<'ctx, E> {
    pub(crate) fn new(ctx: &'ctx DbContext) -> Self {
        Self {
            ctx,
            _entity: PhantomData,
        }
    }

    /// Loads one row by primary key.
    pub fn find(&self, key: &E::Key) -> DbResult<Option<E>> {
        let sql = format!(
            "{} WHERE {} = ?1;",
            select_sql::<E>(),
            quote_ident(E::KEY_COLUMN)
        );
        let entity = self
            .ctx
            .connection()
            .query_row(&sql, params![key], |row| E::from_row(row))
            .optional()?;
        Ok(entity)
    }

    /// Loads one row by primary key when it also satisfies `select.conditions`.
    ///
    /// Ordering and windowing in `select` are ignored.
    pub fn find_matching(&self, key: &E::Key, select: &Select) -> DbResult<Option<E>> {
        let mut sql = format!(
            "{} WHERE {} = ?",
            select_sql::<E>(),
            quote_ident(E::KEY_COLUMN)
        );
        for condition in &select.conditions {
            sql.push_str(" AND ");
            sql.push_str(condition);
        }

        let mut bind: Vec<&dyn ToSql> = Vec::with_capacity(select.params.len() + 1);
        bind.push(key);
        bind.extend(select.params.iter().map(|v| v as &dyn ToSql));
        let entity = self
            .ctx
            .connection()
            .query_row(&sql, bind.as_slice(), |row| E::from_row(row))
            .optional()?;
        Ok(entity)
    }

    /// Runs a composed select and decodes every row.
    pub fn query(&self, select: &Select) -> DbResult<Vec<E>> {
        let mut sql = select_sql::<E>();
        let mut bind_values = select.params.clone();

        if !select.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&select.conditions.join(" AND "));
        }

        if !select.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&select.order_by.join(", "));
        }

        if let Some(limit) = select.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(to_sql_int(limit)));
            bind_values.push(Value::Integer(to_sql_int(select.offset)));
        } else if select.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(to_sql_int(select.offset)));
        }

        let mut stmt = self.ctx.connection().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_values), |row| E::from_row(row))?;
        let mut entities = Vec::new();
        for entity in rows {
            entities.push(entity?);
        }
        Ok(entities)
    }

    /// Stages an insert. Assigns the generated row id when `key()` is `None`.
    pub fn insert(&self, entity: &mut E) -> DbResult<()> {
        self.ctx.begin_if_needed()?;

        let key = entity.key();
        let values = entity.values();
        let mut columns: Vec<String> = E::COLUMNS.iter().map(|c| quote_ident(c)).collect();
        let mut bind: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
        if let Some(key) = key.as_ref() {
            columns.push(quote_ident(E::KEY_COLUMN));
            bind.push(key);
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", quote_ident(E::TABLE))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                quote_ident(E::TABLE),
                columns.join(", "),
                placeholders(columns.len())
            )
        };

        let conn = self.ctx.connection();
        let changed = conn.execute(&sql, bind.as_slice())?;
        if key.is_none() {
            entity.assign_key(conn.last_insert_rowid());
        }
        self.ctx.record_changes(changed);
        Ok(())
    }

    /// Stages a full-row update by key.
    ///
    /// # Errors
    /// - `MissingKey` when the entity has never been stored.
    /// - `ConcurrencyConflict` when no row matches the key, including
    ///   key-only entities with nothing to write.
    pub fn update(&self, entity: &E) -> DbResult<()> {
        let key = entity
            .key()
            .ok_or(DbError::MissingKey { table: E::TABLE })?;
        if E::COLUMNS.is_empty() {
            return self.ensure_exists(&key);
        }
        self.ctx.begin_if_needed()?;

        let values = entity.values();
        let assignments = E::COLUMNS
            .iter()
            .map(|column| format!("{} = ?", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?;",
            quote_ident(E::TABLE),
            assignments,
            quote_ident(E::KEY_COLUMN)
        );

        let mut bind: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
        bind.push(&key);
        let changed = self.ctx.connection().execute(&sql, bind.as_slice())?;
        if changed == 0 {
            return Err(DbError::ConcurrencyConflict {
                table: E::TABLE,
                key: format!("{key:?}"),
            });
        }
        self.ctx.record_changes(changed);
        Ok(())
    }

    fn ensure_exists(&self, key: &E::Key) -> DbResult<()> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
            quote_ident(E::TABLE),
            quote_ident(E::KEY_COLUMN)
        );
        let exists: bool = self
            .ctx
            .connection()
            .query_row(&sql, params![key], |row| row.get(0))?;
        if exists {
            Ok(())
        } else {
            Err(DbError::ConcurrencyConflict {
                table: E::TABLE,
                key: format!("{key:?}"),
            })
        }
    }

    /// Stages a delete by key and returns the number of rows removed.
    pub fn remove(&self, key: &E::Key) -> DbResult<usize> {
        self.ctx.begin_if_needed()?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1;",
            quote_ident(E::TABLE),
            quote_ident(E::KEY_COLUMN)
        );
        let changed = self.ctx.connection().execute(&sql, params![key])?;
        self.ctx.record_changes(changed);
        Ok(changed)
    }
}

fn select_sql<E: Entity>() -> String {
    let columns = std::iter::once(E::KEY_COLUMN)
        .chain(E::COLUMNS.iter().copied())
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} FROM {}", columns, quote_ident(E::TABLE))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
