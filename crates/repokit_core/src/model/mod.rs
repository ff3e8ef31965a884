//! Entity contracts shared by the persistence context and repositories.
//!
//! # Responsibility
//! - Define how an entity maps to a table and which capabilities it has.
//! - Ship one fully featured example entity.
//!
//! # Invariants
//! - Capability sets are fixed per type; they never change per instance.

pub mod entity;
pub mod example;
