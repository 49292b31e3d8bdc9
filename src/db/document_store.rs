// Document store abstraction
// One schemaless collection per resource type, store-assigned identifiers

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field map of a stored document (everything except the identifier)
pub type Fields = Map<String, Value>;

/// Length of store-assigned document identifiers
pub const DOCUMENT_ID_LENGTH: usize = 20;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Duplicate document violates unique constraint `{0}`")]
    Duplicate(String),

    #[error("Document is not a JSON object")]
    Corrupted,
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match error {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => StoreError::Duplicate(
                info.constraint_name()
                    .unwrap_or_else(|| info.message())
                    .to_string(),
            ),
            _ => StoreError::Database(error.to_string()),
        }
    }
}

/// A stored document: identifier plus schemaless fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// JSON representation returned to clients: `{"id": ..., ...fields}`
    pub fn to_json(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }
}

/// Persistence adapter for the zoo collections.
///
/// `update` merges the given fields into the stored document (top-level keys
/// are replaced, others kept) and returns `None` when the document does not
/// exist. `delete` reports whether a document was removed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Documents whose top-level `field` equals `value`
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Backend reachability check used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}
