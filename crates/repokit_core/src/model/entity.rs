//! Entity contract and optional capability traits.
//!
//! # Responsibility
//! - Describe how an entity type maps onto one SQLite table.
//! - Declare which cross-cutting capabilities a type opts into.
//!
//! # Invariants
//! - `Entity::CAPABILITIES` is authoritative. Reads filter on it in SQL;
//!   an accessor is consulted only for a capability it enables, and a
//!   declared capability whose mutable accessor returns `None` is an error.
//! - `Entity::values()` yields one value per entry of `Entity::COLUMNS`,
//!   in the same order.
//! - Capability columns use the fixed names below.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Row, ToSql};
use std::fmt::Debug;

/// UTC instant used for audit stamps.
pub type Timestamp = DateTime<Utc>;

pub const IS_DELETED_COLUMN: &str = "is_deleted";
pub const LANG_CODE_COLUMN: &str = "lang_code";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const CREATED_BY_COLUMN: &str = "created_by";
pub const UPDATED_AT_COLUMN: &str = "updated_at";
pub const UPDATED_BY_COLUMN: &str = "updated_by";

const AUDIT_COLUMNS: &[&str] = &[
    CREATED_AT_COLUMN,
    CREATED_BY_COLUMN,
    UPDATED_AT_COLUMN,
    UPDATED_BY_COLUMN,
];

/// Static descriptor of the capabilities an entity type implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub soft_delete: bool,
    pub localized: bool,
    pub auditable: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        soft_delete: false,
        localized: false,
        auditable: false,
    };

    pub const ALL: Self = Self {
        soft_delete: true,
        localized: true,
        auditable: true,
    };

    pub const fn with_soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    pub const fn with_localized(mut self) -> Self {
        self.localized = true;
        self
    }

    pub const fn with_auditable(mut self) -> Self {
        self.auditable = true;
        self
    }

    /// Columns the table must carry for the enabled capabilities.
    pub fn required_columns(self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        if self.soft_delete {
            columns.push(IS_DELETED_COLUMN);
        }
        if self.localized {
            columns.push(LANG_CODE_COLUMN);
        }
        if self.auditable {
            columns.extend_from_slice(AUDIT_COLUMNS);
        }
        columns
    }
}

/// Entity hidden from normal reads once flagged.
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);
}

/// Entity that represents one language variant.
pub trait Localized {
    fn lang_code(&self) -> &str;
}

/// Entity stamped with creation/update metadata by the repository.
pub trait Auditable {
    fn created_at(&self) -> Option<Timestamp>;
    fn set_created_at(&mut self, at: Timestamp);
    fn created_by(&self) -> Option<&str>;
    fn set_created_by(&mut self, actor: &str);
    fn updated_at(&self) -> Option<Timestamp>;
    fn set_updated_at(&mut self, at: Timestamp);
    fn updated_by(&self) -> Option<&str>;
    fn set_updated_by(&mut self, actor: &str);
}

/// Mapping between a Rust type and one SQLite table.
///
/// Capability accessors default to `None`; a type overrides the ones it
/// declares in `CAPABILITIES`. Accessors for undeclared capabilities are
/// ignored by the repository.
pub trait Entity: Sized {
    /// Primary key type.
    type Key: ToSql + Clone + Debug;

    const TABLE: &'static str;
    const KEY_COLUMN: &'static str = "id";
    /// Non-key columns written on insert/update, in `values()` order.
    const COLUMNS: &'static [&'static str];
    const CAPABILITIES: Capabilities = Capabilities::NONE;

    /// Returns `None` until a generated key has been assigned.
    fn key(&self) -> Option<Self::Key>;

    /// Receives the SQLite row id after an insert without a key.
    fn assign_key(&mut self, _rowid: i64) {}

    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn as_soft_delete(&self) -> Option<&dyn SoftDelete> {
        None
    }

    fn as_soft_delete_mut(&mut self) -> Option<&mut dyn SoftDelete> {
        None
    }

    fn as_localized(&self) -> Option<&dyn Localized> {
        None
    }

    fn as_auditable(&self) -> Option<&dyn Auditable> {
        None
    }

    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        None
    }
}

/// Encodes an optional audit stamp as RFC 3339 text.
pub fn timestamp_value(at: Option<Timestamp>) -> Value {
    match at {
        Some(at) => Value::Text(at.to_rfc3339()),
        None => Value::Null,
    }
}

/// Encodes optional text, mapping `None` to SQL `NULL`.
pub fn text_value(text: Option<&str>) -> Value {
    match text {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::{timestamp_value, Capabilities, IS_DELETED_COLUMN, LANG_CODE_COLUMN};
    use chrono::{TimeZone, Utc};
    use rusqlite::types::Value;

    #[test]
    fn builders_enable_single_capabilities() {
        let caps = Capabilities::NONE.with_soft_delete();
        assert!(caps.soft_delete);
        assert!(!caps.localized);
        assert!(!caps.auditable);
        assert_eq!(
            Capabilities::NONE
                .with_soft_delete()
                .with_localized()
                .with_auditable(),
            Capabilities::ALL
        );
    }

    #[test]
    fn required_columns_follow_enabled_capabilities() {
        assert!(Capabilities::NONE.required_columns().is_empty());
        assert_eq!(
            Capabilities::NONE.with_localized().required_columns(),
            vec![LANG_CODE_COLUMN]
        );

        let all = Capabilities::ALL.required_columns();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], IS_DELETED_COLUMN);
    }

    #[test]
    fn timestamp_value_uses_rfc3339_text() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            timestamp_value(Some(at)),
            Value::Text("2024-05-01T12:30:00+00:00".to_string())
        );
        assert_eq!(timestamp_value(None), Value::Null);
    }
}
