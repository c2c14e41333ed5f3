//! In-process document store.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, StoreError, StoreResult};

/// A [`DocumentStore`] kept entirely in memory.
///
/// Every operation runs under a single lock, which makes `append` atomic.
/// Collections keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

fn find_mut<'a>(docs: &'a mut [Document], id: &str) -> Option<&'a mut Document> {
    docs.iter_mut().find(|doc| doc.id == id)
}

impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.lock().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn get_one(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match find_mut(docs, id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(Document::new(id, fields)),
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| find_mut(docs, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        for (key, value) in patch {
            doc.fields.insert(key, value);
        }
        Ok(())
    }

    async fn append(&self, collection: &str, id: &str, field: &str, value: Value) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| find_mut(docs, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        match doc
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(StoreError::NotAList {
                collection: collection.to_string(),
                id: id.to_string(),
                field: field.to_string(),
            }),
        }
    }
}
