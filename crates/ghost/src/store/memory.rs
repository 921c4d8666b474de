/// In-process document store, used for dry runs and tests
use super::{union_into, DocumentStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

#[derive(Default)]
pub struct MemoryStore {
    documents: DashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn key(collection: &str, id: &str) -> (String, String) {
        (collection.to_string(), id.to_string())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.documents.insert(Self::key(collection, id), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .documents
            .get(&Self::key(collection, id))
            .map(|doc| doc.value().clone()))
    }

    async fn batch_get(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Option<Value>>, StoreError> {
        Ok(ids
            .iter()
            .map(|id| {
                self.documents
                    .get(&Self::key(collection, id))
                    .map(|doc| doc.value().clone())
            })
            .collect())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        // The shard write lock makes the read-modify-write atomic
        let mut document = self
            .documents
            .get_mut(&Self::key(collection, id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        union_into(document.value_mut(), collection, id, field, value)?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let mut docs: Vec<(String, Value)> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs.into_iter().map(|(_, doc)| doc).collect())
    }
}
