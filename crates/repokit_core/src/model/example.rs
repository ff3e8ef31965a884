//! Bundled example entity with every capability enabled.
//!
//! # Invariants
//! - `id` is `None` until the row has been inserted.
//! - Audit fields are written by the repository, never by constructors.

use super::entity::{
    text_value, timestamp_value, Auditable, Capabilities, Entity, Localized, SoftDelete, Timestamp,
};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LANG_CODE: &str = "en";

/// Localized, soft-deletable, auditable record stored in `example_entities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleEntity {
    pub id: Option<i64>,
    pub name: String,
    pub lang_code: String,
    pub is_deleted: bool,
    pub created_at: Option<Timestamp>,
    pub created_by: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<String>,
}

impl ExampleEntity {
    /// Creates an unsaved entity in the default language.
    pub fn new(name: impl Into<String>) -> Self {
        Self::localized(name, DEFAULT_LANG_CODE)
    }

    /// Creates an unsaved entity for one language variant.
    pub fn localized(name: impl Into<String>, lang_code: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            lang_code: lang_code.into(),
            is_deleted: false,
            created_at: None,
            created_by: None,
            updated_at: None,
            updated_by: None,
        }
    }
}

impl Entity for ExampleEntity {
    type Key = i64;

    const TABLE: &'static str = "example_entities";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "lang_code",
        "is_deleted",
        "created_at",
        "created_by",
        "updated_at",
        "updated_by",
    ];
    const CAPABILITIES: Capabilities = Capabilities::ALL;

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.lang_code.clone()),
            Value::from(self.is_deleted),
            timestamp_value(self.created_at),
            text_value(self.created_by.as_deref()),
            timestamp_value(self.updated_at),
            text_value(self.updated_by.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            lang_code: row.get("lang_code")?,
            is_deleted: row.get("is_deleted")?,
            created_at: row.get("created_at")?,
            created_by: row.get("created_by")?,
            updated_at: row.get("updated_at")?,
            updated_by: row.get("updated_by")?,
        })
    }

    fn as_soft_delete(&self) -> Option<&dyn SoftDelete> {
        Some(self)
    }

    fn as_soft_delete_mut(&mut self) -> Option<&mut dyn SoftDelete> {
        Some(self)
    }

    fn as_localized(&self) -> Option<&dyn Localized> {
        Some(self)
    }

    fn as_auditable(&self) -> Option<&dyn Auditable> {
        Some(self)
    }

    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        Some(self)
    }
}

impl SoftDelete for ExampleEntity {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl Localized for ExampleEntity {
    fn lang_code(&self) -> &str {
        &self.lang_code
    }
}

impl Auditable for ExampleEntity {
    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn set_created_at(&mut self, at: Timestamp) {
        self.created_at = Some(at);
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    fn set_created_by(&mut self, actor: &str) {
        self.created_by = Some(actor.to_string());
    }

    fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }

    fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    fn set_updated_by(&mut self, actor: &str) {
        self.updated_by = Some(actor.to_string());
    }
}
