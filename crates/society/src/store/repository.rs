use serde_json::Value;

use super::document::RecordId;
use crate::records::UserId;

/// Storage abstraction over a document database. Documents travel as JSON values; the service
/// owns encoding and decoding.
pub trait DocumentStore: Send + Sync {
    fn insert(&self, collection: &str, id: &RecordId, document: Value) -> Result<(), StoreError>;
    fn fetch(&self, collection: &str, id: &RecordId) -> Result<Option<Value>, StoreError>;
    fn replace(&self, collection: &str, id: &RecordId, document: Value) -> Result<(), StoreError>;
    fn delete(&self, collection: &str, id: &RecordId) -> Result<Value, StoreError>;
    /// Every document in the collection, oldest insertion first.
    fn list(&self, collection: &str) -> Result<Vec<(RecordId, Value)>, StoreError>;
}

/// Lookup for the user identities complaints refer to.
pub trait UserDirectory: Send + Sync {
    fn contains(&self, user: &UserId) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("{collection} record {id} not found")]
    NotFound { collection: String, id: RecordId },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{collection} record {id} could not be decoded: {reason}")]
    Corrupt {
        collection: String,
        id: RecordId,
        reason: String,
    },
}

impl StoreError {
    pub fn not_found(collection: &str, id: &RecordId) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        }
    }
}
