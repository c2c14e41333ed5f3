//! Remote document store abstraction.
//!
//! A store holds named collections of JSON documents addressed by id. The
//! sync layer only talks to the store through [`DocumentStore`], so the same
//! logic runs against the in-process [`MemoryStore`] and the SQLite store used
//! by the `chat` binary.
//!
//! # Collections
//!
//! - `conversations`: `{ users: [..], created: <millis>, messages: [..] }`
//! - `users`: `{ firstName, lastName }`, keyed by handle
//!
//! No cross-document transactions are assumed. The one multi-step write the
//! sync layer needs, appending a message, is a single [`DocumentStore::append`]
//! call that each implementation must perform atomically.

mod error;
mod memory;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Collection holding conversation documents.
pub const CONVERSATIONS: &str = "conversations";
/// Collection holding user documents.
pub const USERS: &str = "users";

/// Top-level fields of a document.
pub type Fields = serde_json::Map<String, Value>;

/// A snapshot of one stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document body.
    pub fn data(&self) -> &Fields {
        &self.fields
    }

    /// Deserializes the document body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// Serializes a value into document fields.
///
/// Fails with [`StoreError::Malformed`] if `value` does not serialize to a
/// JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Malformed(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// A collection/document database.
///
/// Implementations must be safe to share between tasks. `append` must be
/// atomic with respect to every other write on the same document: two
/// concurrent appends both land, in some order.
pub trait DocumentStore: Send + Sync {
    /// Returns every document in `collection`, in insertion order.
    fn get_all(&self, collection: &str) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Returns one document, or `None` if it doesn't exist.
    fn get_one(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Creates a document and returns its store-assigned id.
    fn add(&self, collection: &str, fields: Fields)
        -> impl Future<Output = StoreResult<String>> + Send;

    /// Replaces (or creates) the document at `id`.
    fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Replaces the given top-level fields of an existing document.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Atomically appends `value` to the list stored in `field`.
    ///
    /// A missing field is treated as an empty list.
    fn append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Returns a handle to a named collection.
    fn collection(&self, name: &str) -> Collection<'_, Self>
    where
        Self: Sized,
    {
        Collection {
            store: self,
            name: name.to_string(),
        }
    }
}

/// Handle to a collection, as returned by [`DocumentStore::collection`].
pub struct Collection<'a, S> {
    store: &'a S,
    name: String,
}

impl<'a, S: DocumentStore> Collection<'a, S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full snapshot read of the collection.
    pub async fn get(&self) -> StoreResult<Vec<Document>> {
        self.store.get_all(&self.name).await
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentRef<'a, S> {
        DocumentRef {
            store: self.store,
            collection: self.name.clone(),
            id: id.into(),
        }
    }

    pub async fn add(&self, fields: Fields) -> StoreResult<String> {
        self.store.add(&self.name, fields).await
    }
}

/// Handle to a single document.
pub struct DocumentRef<'a, S> {
    store: &'a S,
    collection: String,
    id: String,
}

impl<S: DocumentStore> DocumentRef<'_, S> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn get(&self) -> StoreResult<Option<Document>> {
        self.store.get_one(&self.collection, &self.id).await
    }

    pub async fn set(&self, fields: Fields) -> StoreResult<()> {
        self.store.set(&self.collection, &self.id, fields).await
    }

    pub async fn update(&self, patch: Fields) -> StoreResult<()> {
        self.store.update(&self.collection, &self.id, patch).await
    }

    pub async fn append(&self, field: &str, value: Value) -> StoreResult<()> {
        self.store
            .append(&self.collection, &self.id, field, value)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_document_decode() {
        #[derive(serde::Deserialize)]
        struct Body {
            name: String,
        }

        let doc = Document::new("d1", fields(json!({ "name": "x" })));
        let body: Body = doc.decode().unwrap();
        assert_eq!(body.name, "x");
        assert_eq!(doc.id(), "d1");
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(to_fields(&json!({ "a": 1 })).is_ok());
        assert!(matches!(to_fields(&5), Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_handles_route_to_store() {
        let store = MemoryStore::new();
        let users = store.collection(USERS);
        assert_eq!(users.name(), "users");

        users
            .doc("mr_a")
            .set(fields(json!({ "firstName": "Andy" })))
            .await
            .unwrap();

        let doc = users.doc("mr_a").get().await.unwrap().unwrap();
        assert_eq!(doc.data()["firstName"], "Andy");

        let id = users.add(fields(json!({ "firstName": "Zed" }))).await.unwrap();
        let all = users.get().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id(), id);
    }
}
