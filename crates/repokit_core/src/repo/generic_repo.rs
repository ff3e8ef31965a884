//! Generic repository contract and its SQLite-backed implementation.
//!
//! # Responsibility
//! - Provide the same CRUD surface for every `Entity` type.
//! - Apply soft-delete, localization and audit rules from capabilities.
//! - Commit through `save_changes` after every mutating call.
//!
//! # Invariants
//! - Soft-deleted rows never come back from `get_by_id`/`get_all`.
//! - Audit stamps are UTC and written only on add/update paths.
//! - A mutating call that fails leaves no staged changes behind.
//! - Capability behavior follows `Entity::CAPABILITIES`; accessors are
//!   consulted only for declared capabilities.
//! - Not-found and undeclared capabilities are silent no-ops for writes.

use super::hooks::SaveHooks;
use super::include::Include;
use super::query::ListQuery;
use super::{RepoError, RepoResult};
use crate::db::{quote_ident, DbContext, Select};
use crate::model::entity::{Auditable, Entity, SoftDelete, IS_DELETED_COLUMN, LANG_CODE_COLUMN};
use chrono::Utc;
use log::{debug, warn};
use rusqlite::types::Value;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::time::Instant;

/// CRUD contract shared by every entity type.
pub trait CrudRepository<E: Entity> {
    /// Loads one visible entity by key.
    ///
    /// Returns `None` when missing, soft-deleted, or localized to a language
    /// other than `lang_code`.
    fn get_by_id(
        &self,
        id: &E::Key,
        lang_code: Option<&str>,
        includes: &[&dyn Include<E>],
    ) -> RepoResult<Option<E>>;

    /// Lists visible entities with filtering, ordering and paging.
    fn get_all(&self, query: &ListQuery, includes: &[&dyn Include<E>]) -> RepoResult<Vec<E>>;

    /// Inserts and commits; the generated key is written back into `entity`.
    ///
    /// The key is assigned before save hooks run, so it stays readable when
    /// an after-save hook fails on a committed row.
    fn add(&self, entity: &mut E, actor: Option<&str>) -> RepoResult<()>;

    fn update(&self, entity: &mut E, actor: Option<&str>) -> RepoResult<()>;

    /// Physically removes the row; missing keys are ignored.
    fn delete(&self, id: &E::Key) -> RepoResult<()>;

    fn soft_delete(&self, id: &E::Key) -> RepoResult<()>;

    /// Clears the soft-delete flag.
    fn activate(&self, id: &E::Key) -> RepoResult<()>;

    /// Updates every entity and commits once.
    fn update_range(&self, entities: &mut [E], actor: Option<&str>) -> RepoResult<()>;

    /// Removes every found key and commits once.
    fn delete_range(&self, ids: &[E::Key]) -> RepoResult<()>;

    /// Runs save hooks around a commit and returns affected rows.
    fn save_changes(&self) -> RepoResult<usize>;
}

/// Repository for entity `E` bound to one context.
pub struct Repository<'ctx, E> {
    ctx: &'ctx DbContext,
    hooks: SaveHooks,
    _entity: PhantomData<fn() -> E>,
}

impl<'ctx, E: Entity> Repository<'ctx, E> {
    /// Binds a repository after checking that the table matches `E`.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `E::TABLE` does not exist.
    /// - `MissingRequiredColumn` when the key, a declared column, or a
    ///   capability column is absent.
    pub fn try_new(ctx: &'ctx DbContext) -> RepoResult<Self> {
        ensure_schema::<E>(ctx)?;
        Ok(Self {
            ctx,
            hooks: SaveHooks::default(),
            _entity: PhantomData,
        })
    }

    /// Replaces the whole hook pipeline.
    pub fn with_hooks(mut self, hooks: SaveHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DbContext) -> RepoResult<()> + 'static,
    {
        self.hooks = self.hooks.before_save(hook);
        self
    }

    pub fn after_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DbContext, usize) -> RepoResult<()> + 'static,
    {
        self.hooks = self.hooks.after_save(hook);
        self
    }

    pub fn context(&self) -> &'ctx DbContext {
        self.ctx
    }

    fn load_includes(&self, entities: &mut [E], includes: &[&dyn Include<E>]) -> RepoResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        for include in includes {
            debug!(
                "event=repo_include module=repo status=start table={} path={} rows={}",
                E::TABLE,
                include.path(),
                entities.len()
            );
            include.load(self.ctx, entities)?;
        }
        Ok(())
    }

    /// Runs `stage` and commits; staged changes are discarded on failure.
    fn commit_with<T>(
        &self,
        operation: &'static str,
        stage: impl FnOnce() -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let staged = match stage() {
            Ok(value) => value,
            Err(err) => {
                self.discard_after_failure(operation);
                warn!(
                    "event=repo_{} module=repo status=error table={} error={}",
                    operation,
                    E::TABLE,
                    err
                );
                return Err(err);
            }
        };
        let affected = self.save_changes()?;
        debug!(
            "event=repo_{} module=repo status=ok table={} affected={} duration_ms={}",
            operation,
            E::TABLE,
            affected,
            started_at.elapsed().as_millis()
        );
        Ok(staged)
    }

    fn discard_after_failure(&self, operation: &'static str) {
        if let Err(err) = self.ctx.discard_changes() {
            warn!(
                "event=discard_changes module=repo status=error operation={} table={} error={}",
                operation,
                E::TABLE,
                err
            );
        }
    }

    /// Loads `id`, flips its soft-delete flag and routes through `update`.
    fn set_deleted_flag(&self, id: &E::Key, deleted: bool) -> RepoResult<()> {
        if !E::CAPABILITIES.soft_delete {
            return Ok(());
        }
        let Some(mut entity) = self.ctx.set::<E>().find(id)? else {
            return Ok(());
        };
        soft_delete_of(&mut entity)?.set_deleted(deleted);
        self.update(&mut entity, None)
    }
}

impl<E: Entity> CrudRepository<E> for Repository<'_, E> {
    fn get_by_id(
        &self,
        id: &E::Key,
        lang_code: Option<&str>,
        includes: &[&dyn Include<E>],
    ) -> RepoResult<Option<E>> {
        let select = visibility_select::<E>(lang_code);
        let Some(mut entity) = self.ctx.set::<E>().find_matching(id, &select)? else {
            return Ok(None);
        };

        self.load_includes(std::slice::from_mut(&mut entity), includes)?;
        Ok(Some(entity))
    }

    fn get_all(&self, query: &ListQuery, includes: &[&dyn Include<E>]) -> RepoResult<Vec<E>> {
        let started_at = Instant::now();
        let mut select = visibility_select::<E>(query.lang_code.as_deref());

        if let Some(filter) = query.filter.as_ref() {
            select.conditions.push(format!("({})", filter.clause()));
            select.params.extend_from_slice(filter.params());
        }

        select.order_by = query.order_by.iter().map(|order| order.to_sql()).collect();

        if let Some((skip, take)) = query.page_window() {
            select.offset = skip;
            select.limit = Some(take);
        }

        let mut entities = self.ctx.set::<E>().query(&select)?;
        self.load_includes(&mut entities, includes)?;

        debug!(
            "event=repo_get_all module=repo status=ok table={} rows={} duration_ms={}",
            E::TABLE,
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    fn add(&self, entity: &mut E, actor: Option<&str>) -> RepoResult<()> {
        if let Some(audit) = auditable_of(entity)? {
            audit.set_created_at(Utc::now());
            if let Some(actor) = actor {
                audit.set_created_by(actor);
            }
        }

        self.commit_with("add", || {
            self.ctx.set::<E>().insert(entity)?;
            Ok(())
        })
    }

    fn update(&self, entity: &mut E, actor: Option<&str>) -> RepoResult<()> {
        stamp_updated(entity, actor)?;
        self.commit_with("update", || {
            self.ctx.set::<E>().update(entity)?;
            Ok(())
        })
    }

    fn delete(&self, id: &E::Key) -> RepoResult<()> {
        let set = self.ctx.set::<E>();
        if set.find(id)?.is_none() {
            return Ok(());
        }
        self.commit_with("delete", || {
            set.remove(id)?;
            Ok(())
        })
    }

    fn soft_delete(&self, id: &E::Key) -> RepoResult<()> {
        self.set_deleted_flag(id, true)
    }

    fn activate(&self, id: &E::Key) -> RepoResult<()> {
        self.set_deleted_flag(id, false)
    }

    fn update_range(&self, entities: &mut [E], actor: Option<&str>) -> RepoResult<()> {
        for entity in entities.iter_mut() {
            stamp_updated(entity, actor)?;
        }
        self.commit_with("update_range", || {
            let set = self.ctx.set::<E>();
            for entity in entities.iter() {
                set.update(entity)?;
            }
            Ok(())
        })
    }

    fn delete_range(&self, ids: &[E::Key]) -> RepoResult<()> {
        let set = self.ctx.set::<E>();
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if set.find(id)?.is_some() {
                found.push(id);
            }
        }
        self.commit_with("delete_range", || {
            for id in found {
                set.remove(id)?;
            }
            Ok(())
        })
    }

    fn save_changes(&self) -> RepoResult<usize> {
        if let Err(err) = self.hooks.run_before(self.ctx) {
            self.discard_after_failure("before_save");
            return Err(err);
        }
        let affected = self.ctx.save_changes()?;
        self.hooks.run_after(self.ctx, affected)?;
        Ok(affected)
    }
}

/// Soft-delete and language conditions shared by both read paths.
fn visibility_select<E: Entity>(lang_code: Option<&str>) -> Select {
    let mut select = Select::default();
    if E::CAPABILITIES.soft_delete {
        select
            .conditions
            .push(format!("{} = 0", quote_ident(IS_DELETED_COLUMN)));
    }
    if let (Some(lang_code), true) = (lang_code, E::CAPABILITIES.localized) {
        select
            .conditions
            .push(format!("{} = ?", quote_ident(LANG_CODE_COLUMN)));
        select.params.push(Value::Text(lang_code.to_string()));
    }
    select
}

fn soft_delete_of<E: Entity>(entity: &mut E) -> RepoResult<&mut dyn SoftDelete> {
    entity
        .as_soft_delete_mut()
        .ok_or(RepoError::CapabilityMismatch {
            table: E::TABLE,
            capability: "soft_delete",
        })
}

/// `None` when `E` does not declare auditing.
fn auditable_of<E: Entity>(entity: &mut E) -> RepoResult<Option<&mut dyn Auditable>> {
    if !E::CAPABILITIES.auditable {
        return Ok(None);
    }
    match entity.as_auditable_mut() {
        Some(audit) => Ok(Some(audit)),
        None => Err(RepoError::CapabilityMismatch {
            table: E::TABLE,
            capability: "auditable",
        }),
    }
}

fn stamp_updated<E: Entity>(entity: &mut E, actor: Option<&str>) -> RepoResult<()> {
    if let Some(audit) = auditable_of(entity)? {
        audit.set_updated_at(Utc::now());
        if let Some(actor) = actor {
            audit.set_updated_by(actor);
        }
    }
    Ok(())
}

fn ensure_schema<E: Entity>(ctx: &DbContext) -> RepoResult<()> {
    let sql = format!("PRAGMA table_info({});", quote_ident(E::TABLE));
    let mut stmt = ctx.connection().prepare(&sql)?;
    let names = stmt.query_map([], |row| row.get::<_, String>("name"))?;
    let mut columns = HashSet::new();
    for name in names {
        columns.insert(name?);
    }

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    let required = std::iter::once(E::KEY_COLUMN)
        .chain(E::COLUMNS.iter().copied())
        .chain(E::CAPABILITIES.required_columns());
    for column in required {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }
    Ok(())
}
