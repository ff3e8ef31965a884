//! Pre/post commit callbacks run by `Repository::save_changes`.
//!
//! # Invariants
//! - Hooks run in registration order.
//! - The first failing hook stops the pipeline and its error is returned.

use super::RepoResult;
use crate::db::DbContext;

type BeforeSave = Box<dyn Fn(&DbContext) -> RepoResult<()>>;
type AfterSave = Box<dyn Fn(&DbContext, usize) -> RepoResult<()>>;

/// Ordered before/after-save callbacks. Empty by default.
#[derive(Default)]
pub struct SaveHooks {
    before: Vec<BeforeSave>,
    after: Vec<AfterSave>,
}

impl SaveHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback run before every commit.
    ///
    /// Returning an error aborts the commit.
    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DbContext) -> RepoResult<()> + 'static,
    {
        self.before.push(Box::new(hook));
        self
    }

    /// Registers a callback run after every commit with the affected row count.
    pub fn after_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DbContext, usize) -> RepoResult<()> + 'static,
    {
        self.after.push(Box::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    pub(crate) fn run_before(&self, ctx: &DbContext) -> RepoResult<()> {
        self.before.iter().try_for_each(|hook| hook(ctx))
    }

    pub(crate) fn run_after(&self, ctx: &DbContext, affected: usize) -> RepoResult<()> {
        self.after.iter().try_for_each(|hook| hook(ctx, affected))
    }
}

impl std::fmt::Debug for SaveHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveHooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
