#![allow(dead_code)]

use repokit_core::model::entity::{text_value, timestamp_value};
use repokit_core::{
    open_db_in_memory, Auditable, Capabilities, ContextOptions, CrudRepository, DbContext, Entity,
    Localized, Migration, Repository, SoftDelete, Timestamp,
};
use rusqlite::types::Value;
use rusqlite::Row;

pub const TEST_MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            created_by TEXT,
            updated_at TEXT,
            updated_by TEXT
        );
        CREATE TABLE articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            lang_code TEXT NOT NULL
        );
        CREATE TABLE tags (
            id TEXT PRIMARY KEY NOT NULL,
            label TEXT NOT NULL
        );",
    ),
    Migration::new(
        2,
        "CREATE TABLE authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );
        CREATE TABLE books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            title TEXT NOT NULL
        );",
    ),
    Migration::new(3, "CREATE TABLE markers (id INTEGER PRIMARY KEY AUTOINCREMENT);"),
];

pub fn setup() -> DbContext {
    open_db_in_memory(&ContextOptions::default(), TEST_MIGRATIONS).unwrap()
}

/// Adds `entity` without an actor and returns it with its assigned key.
pub fn add_new<E: Entity>(repo: &Repository<'_, E>, mut entity: E) -> E {
    repo.add(&mut entity, None).unwrap();
    entity
}

/// Soft-deletable and auditable, not localized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub price: i64,
    pub is_deleted: bool,
    pub created_at: Option<Timestamp>,
    pub created_by: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<String>,
}

impl Product {
    pub fn new(name: &str, price: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            price,
            is_deleted: false,
            created_at: None,
            created_by: None,
            updated_at: None,
            updated_by: None,
        }
    }
}

impl Entity for Product {
    type Key = i64;

    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "price",
        "is_deleted",
        "created_at",
        "created_by",
        "updated_at",
        "updated_by",
    ];
    const CAPABILITIES: Capabilities = Capabilities::NONE.with_soft_delete().with_auditable();

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.price),
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
            price: row.get("price")?,
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

    fn as_auditable(&self) -> Option<&dyn Auditable> {
        Some(self)
    }

    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        Some(self)
    }
}

impl SoftDelete for Product {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl Auditable for Product {
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

/// Localized only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub lang_code: String,
}

impl Article {
    pub fn new(title: &str, lang_code: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            lang_code: lang_code.to_string(),
        }
    }
}

impl Entity for Article {
    type Key = i64;

    const TABLE: &'static str = "articles";
    const COLUMNS: &'static [&'static str] = &["title", "lang_code"];
    const CAPABILITIES: Capabilities = Capabilities::NONE.with_localized();

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.lang_code.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            lang_code: row.get("lang_code")?,
        })
    }

    fn as_localized(&self) -> Option<&dyn Localized> {
        Some(self)
    }
}

impl Localized for Article {
    fn lang_code(&self) -> &str {
        &self.lang_code
    }
}

/// No capabilities; caller-provided text key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

impl Tag {
    pub fn new(label: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.to_string(),
        }
    }
}

impl Entity for Tag {
    type Key = String;

    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["label"];

    fn key(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.label.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
        })
    }
}

/// Parent entity with an eagerly loadable `books` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
    pub books: Vec<Book>,
}

impl Author {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            books: Vec::new(),
        }
    }
}

impl Entity for Author {
    type Key = i64;

    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            books: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Option<i64>,
    pub author_id: i64,
    pub title: String,
}

impl Book {
    pub fn new(author_id: i64, title: &str) -> Self {
        Self {
            id: None,
            author_id,
            title: title.to_string(),
        }
    }
}

impl Entity for Book {
    type Key = i64;

    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["author_id", "title"];

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.author_id),
            Value::Text(self.title.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            author_id: row.get("author_id")?,
            title: row.get("title")?,
        })
    }
}

/// Declares soft-delete over `products` but never exposes the trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flagged {
    pub id: Option<i64>,
    pub name: String,
    pub is_deleted: bool,
}

impl Flagged {
    pub fn new(name: &str, is_deleted: bool) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            is_deleted,
        }
    }
}

impl Entity for Flagged {
    type Key = i64;

    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &["name", "is_deleted"];
    const CAPABILITIES: Capabilities = Capabilities::NONE.with_soft_delete();

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::from(self.is_deleted)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            is_deleted: row.get("is_deleted")?,
        })
    }
}

/// Key-only entity: nothing but a generated id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Marker {
    pub id: Option<i64>,
}

impl Entity for Marker {
    type Key = i64;

    const TABLE: &'static str = "markers";
    const COLUMNS: &'static [&'static str] = &[];

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn assign_key(&mut self, rowid: i64) {
        self.id = Some(rowid);
    }

    fn values(&self) -> Vec<Value> {
        Vec::new()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { id: row.get("id")? })
    }
}
