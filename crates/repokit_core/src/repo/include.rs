//! Eager loading of related data for repository reads.
//!
//! An include resolves one relation path for a whole result set at once,
//! so a listing costs one extra query per include rather than per row.

use super::RepoResult;
use crate::db::DbContext;

/// Loads one relation for a batch of already-fetched entities.
pub trait Include<E> {
    /// Relation path, used in logs.
    fn path(&self) -> &str;

    fn load(&self, ctx: &DbContext, entities: &mut [E]) -> RepoResult<()>;
}

/// Closure-backed include built by [`include`].
pub struct IncludeWith<F> {
    path: &'static str,
    loader: F,
}

impl<E, F> Include<E> for IncludeWith<F>
where
    F: Fn(&DbContext, &mut [E]) -> RepoResult<()>,
{
    fn path(&self) -> &str {
        self.path
    }

    fn load(&self, ctx: &DbContext, entities: &mut [E]) -> RepoResult<()> {
        (self.loader)(ctx, entities)
    }
}

/// Builds an include from a path name and a batch loader.
pub fn include<E, F>(path: &'static str, loader: F) -> IncludeWith<F>
where
    F: Fn(&DbContext, &mut [E]) -> RepoResult<()>,
{
    IncludeWith { path, loader }
}
