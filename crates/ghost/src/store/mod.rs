//! Document store abstraction.
//!
//! Documents are JSON objects addressed by `(collection, id)`. The scraper
//! only needs upserts, point reads, batched reads and an append-if-absent
//! update on array fields.

pub mod catalog;
mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection names.
pub const COURSES: &str = "courses";
pub const SECTIONS: &str = "sections";
pub const ROOMS: &str = "rooms";

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed document does not exist
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// The document exists but does not have the expected shape
    #[error("Document {collection}/{id} is malformed: {message}")]
    Malformed {
        collection: String,
        id: String,
        message: String,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Background task failed or a lock was poisoned
    #[error("Store task failed: {0}")]
    Task(String),
}

/// A minimal document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or overwrites a document.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Reads one document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Reads many documents in one round trip, in the order of `ids`.
    async fn batch_get(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Option<Value>>, StoreError>;

    /// Appends `value` to the array `field` unless already present.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Reads every document of a collection, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}

/// Applies an array union to a document in place.
///
/// A missing or `null` field becomes a one-element array. Returns whether
/// the document changed.
pub(crate) fn union_into(
    document: &mut Value,
    collection: &str,
    id: &str,
    field: &str,
    value: Value,
) -> Result<bool, StoreError> {
    let malformed = |message: &str| StoreError::Malformed {
        collection: collection.to_string(),
        id: id.to_string(),
        message: message.to_string(),
    };

    let object = document
        .as_object_mut()
        .ok_or_else(|| malformed("document is not an object"))?;

    let entry = object
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if entry.is_null() {
        *entry = Value::Array(Vec::new());
    }

    let array = entry
        .as_array_mut()
        .ok_or_else(|| malformed(&format!("field '{field}' is not an array")))?;

    if array.contains(&value) {
        return Ok(false);
    }
    array.push(value);
    Ok(true)
}
