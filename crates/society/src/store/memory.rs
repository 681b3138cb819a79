use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::document::RecordId;
use super::repository::{DocumentStore, StoreError, UserDirectory};
use crate::config::DirectoryConfig;
use crate::records::UserId;

type Collections = HashMap<String, Collection>;

/// Documents of one collection plus the insertion counter that orders them. Ids are opaque
/// strings, so their lexical order says nothing about age.
#[derive(Debug, Default)]
struct Collection {
    inserted: u64,
    documents: HashMap<RecordId, Slot>,
}

#[derive(Debug)]
struct Slot {
    position: u64,
    document: Value,
}

/// Process-local document store. Each call takes the single lock, so every operation is atomic
/// per document and nothing spans documents.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryDocumentStore {
    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("document store mutex poisoned".to_string()))
    }

    pub fn count(&self, collection: &str) -> Result<usize, StoreError> {
        Ok(self
            .lock()?
            .get(collection)
            .map_or(0, |entries| entries.documents.len()))
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert(&self, collection: &str, id: &RecordId, document: Value) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let entries = guard.entry(collection.to_string()).or_default();
        if entries.documents.contains_key(id) {
            return Err(StoreError::Conflict);
        }
        entries.inserted += 1;
        let position = entries.inserted;
        entries
            .documents
            .insert(id.clone(), Slot { position, document });
        Ok(())
    }

    fn fetch(&self, collection: &str, id: &RecordId) -> Result<Option<Value>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .and_then(|entries| entries.documents.get(id))
            .map(|slot| slot.document.clone()))
    }

    fn replace(&self, collection: &str, id: &RecordId, document: Value) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        match guard
            .get_mut(collection)
            .and_then(|entries| entries.documents.get_mut(id))
        {
            Some(slot) => {
                slot.document = document;
                Ok(())
            }
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    fn delete(&self, collection: &str, id: &RecordId) -> Result<Value, StoreError> {
        let mut guard = self.lock()?;
        guard
            .get_mut(collection)
            .and_then(|entries| entries.documents.remove(id))
            .map(|slot| slot.document)
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    fn list(&self, collection: &str) -> Result<Vec<(RecordId, Value)>, StoreError> {
        let guard = self.lock()?;
        let Some(entries) = guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut slots: Vec<_> = entries.documents.iter().collect();
        slots.sort_by_key(|(_, slot)| slot.position);
        Ok(slots
            .into_iter()
            .map(|(id, slot)| (id.clone(), slot.document.clone()))
            .collect())
    }
}

/// Directory backed by a fixed id set, or open to any id when built with [`Self::open`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    known: Option<HashSet<UserId>>,
}

impl InMemoryUserDirectory {
    pub fn open() -> Self {
        Self { known: None }
    }

    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(users.into_iter().map(|id| UserId(id.into())).collect()),
        }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        match &config.known_users {
            Some(users) => Self::with_users(users.iter().cloned()),
            None => Self::open(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.known.is_none()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn contains(&self, user: &UserId) -> Result<bool, StoreError> {
        Ok(match &self.known {
            Some(known) => known.contains(user),
            None => true,
        })
    }
}
