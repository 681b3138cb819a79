use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::document::{Document, RecordId};
use super::repository::{DocumentStore, StoreError, UserDirectory};
use crate::records::{
    screen, settle, Complaint, ComplaintStatus, Draft, FieldError, FieldKind, Record, Screened,
    TimestampPolicy, ValidationError, Visitor, VisitorStatus,
};

/// Source of "now" for defaults and timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Service composing the document store, the user directory, and record validation.
pub struct SocietyService<S, U> {
    store: Arc<S>,
    users: Arc<U>,
    clock: Clock,
    sequence: AtomicU64,
}

impl<S, U> SocietyService<S, U>
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    pub fn new(store: Arc<S>, users: Arc<U>) -> Self {
        Self {
            store,
            users,
            clock: Arc::new(Utc::now),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn next_id<R: Record>(&self) -> RecordId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        RecordId(format!(
            "{}-{id:06}",
            R::SCHEMA.handle.to_ascii_lowercase()
        ))
    }

    /// Validate a draft and persist it under a fresh id.
    pub fn create<R: Record>(&self, draft: R::Draft) -> Result<Document<R>, ServiceError> {
        let record = R::from_draft(draft, self.now()).map_err(rejected)?;
        self.insert_new(record)
    }

    /// Create from an untyped JSON body. Fields with the wrong JSON type are reported together
    /// with every other validation failure.
    pub fn create_json<R: Record>(&self, body: Value) -> Result<Document<R>, ServiceError> {
        let Screened { draft, mismatched } =
            screen::<R::Draft>(R::SCHEMA, body).map_err(rejected)?;
        let outcome = R::from_draft(draft, self.now());
        let record = settle(R::SCHEMA, mismatched, outcome).map_err(rejected)?;
        self.insert_new(record)
    }

    fn insert_new<R: Record>(&self, record: R) -> Result<Document<R>, ServiceError> {
        self.ensure_references(&record)?;

        let document = Document::new(self.next_id::<R>(), record);
        let encoded = encode(&document)?;
        self.store
            .insert(R::SCHEMA.collection, &document.id, encoded)?;

        advise(&document);
        info!(handle = R::SCHEMA.handle, id = %document.id, "record created");
        Ok(document)
    }

    pub fn fetch<R: Record>(&self, id: &RecordId) -> Result<Document<R>, ServiceError> {
        let collection = R::SCHEMA.collection;
        let value = self
            .store
            .fetch(collection, id)?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        Ok(decode(collection, id, value)?)
    }

    pub fn list<R: Record>(&self) -> Result<Vec<Document<R>>, ServiceError> {
        let collection = R::SCHEMA.collection;
        self.store
            .list(collection)?
            .into_iter()
            .map(|(id, value)| decode(collection, &id, value).map_err(ServiceError::from))
            .collect()
    }

    /// Apply the supplied fields on top of the stored record and validate the result.
    ///
    /// `createdAt` always survives. `updatedAt` moves to now only for schemas with automatic
    /// timestamps; manual-timestamp records keep whatever the merged draft carries.
    pub fn update<R: Record>(
        &self,
        id: &RecordId,
        patch: R::Draft,
    ) -> Result<Document<R>, ServiceError> {
        self.apply_patch(id, patch, Vec::new())
    }

    /// Update from an untyped JSON patch; see [`create_json`](Self::create_json).
    pub fn update_json<R: Record>(
        &self,
        id: &RecordId,
        body: Value,
    ) -> Result<Document<R>, ServiceError> {
        let Screened { draft, mismatched } =
            screen::<R::Draft>(R::SCHEMA, body).map_err(rejected)?;
        self.apply_patch(id, draft, mismatched)
    }

    fn apply_patch<R: Record>(
        &self,
        id: &RecordId,
        patch: R::Draft,
        mismatched: Vec<FieldError>,
    ) -> Result<Document<R>, ServiceError> {
        let existing = self.fetch::<R>(id)?;
        let merged = patch.overlay(existing.record.to_draft());
        let now = self.now();
        let outcome = R::from_draft(merged, now);
        let mut record = settle(R::SCHEMA, mismatched, outcome).map_err(rejected)?;

        if R::SCHEMA.timestamps == TimestampPolicy::Automatic {
            let timestamps = record.timestamps_mut();
            timestamps.created_at = existing.record.timestamps().created_at;
            timestamps.updated_at = now;
        }

        self.ensure_references(&record)?;
        let document = Document::new(existing.id, record);
        self.persist(&document)?;

        info!(handle = R::SCHEMA.handle, id = %document.id, "record updated");
        Ok(document)
    }

    pub fn delete<R: Record>(&self, id: &RecordId) -> Result<Document<R>, ServiceError> {
        let collection = R::SCHEMA.collection;
        let value = self.store.delete(collection, id)?;
        let document = decode(collection, id, value)?;
        info!(handle = R::SCHEMA.handle, %id, "record deleted");
        Ok(document)
    }

    /// Append a comment to a complaint. Complaint timestamps are manual, so they stay put.
    pub fn add_comment(
        &self,
        id: &RecordId,
        comment: impl Into<String>,
    ) -> Result<Document<Complaint>, ServiceError> {
        let comment = comment.into();
        if comment.trim().is_empty() {
            return Err(rejected(ValidationError::single(
                Complaint::SCHEMA.handle,
                "comments",
                "comment must not be empty",
            )));
        }

        let mut document = self.fetch::<Complaint>(id)?;
        document.record.comments.push(comment);
        self.persist(&document)?;

        debug!(%id, comments = document.record.comments.len(), "complaint comment appended");
        Ok(document)
    }

    /// Move a complaint to any status. No transition is off limits.
    pub fn set_complaint_status(
        &self,
        id: &RecordId,
        status: ComplaintStatus,
    ) -> Result<Document<Complaint>, ServiceError> {
        let mut document = self.fetch::<Complaint>(id)?;
        let previous = document.record.status;
        document.record.status = status;
        self.persist(&document)?;

        info!(%id, from = %previous, to = %status, "complaint status changed");
        Ok(document)
    }

    /// Record a visitor's departure: sets `checkOut` (default now) and the `checked-out` status
    /// together. Calling it again overwrites the departure time.
    pub fn check_out(
        &self,
        id: &RecordId,
        at: Option<DateTime<Utc>>,
    ) -> Result<Document<Visitor>, ServiceError> {
        let now = self.now();
        let mut document = self.fetch::<Visitor>(id)?;
        if document.record.check_out.is_some() {
            debug!(%id, "visitor already checked out; overwriting departure time");
        }

        document.record.check_out = Some(at.unwrap_or(now));
        document.record.status = VisitorStatus::CheckedOut;
        document.record.timestamps.updated_at = now;
        self.persist(&document)?;

        info!(%id, visitor = %document.record.visitor_name, "visitor checked out");
        Ok(document)
    }

    fn persist<R: Record>(&self, document: &Document<R>) -> Result<(), ServiceError> {
        let encoded = encode(document)?;
        self.store
            .replace(R::SCHEMA.collection, &document.id, encoded)?;
        advise(document);
        Ok(())
    }

    fn ensure_references<R: Record>(&self, record: &R) -> Result<(), ServiceError> {
        let Some(user) = record.user_reference() else {
            return Ok(());
        };

        if self.users.contains(user)? {
            return Ok(());
        }

        let spec = R::SCHEMA
            .fields
            .iter()
            .find(|field| matches!(field.kind, FieldKind::Reference { .. }));
        let (field, message) = match spec {
            Some(spec) => (spec.name, spec.invalid_message()),
            None => ("userId", format!("user {user} does not exist")),
        };
        Err(rejected(ValidationError::single(
            R::SCHEMA.handle,
            field,
            message,
        )))
    }
}

fn rejected(error: ValidationError) -> ServiceError {
    debug!(handle = error.handle, %error, "draft rejected");
    ServiceError::Validation(error)
}

fn advise<R: Record>(document: &Document<R>) {
    if let Some(note) = document.record.advisory() {
        warn!(handle = R::SCHEMA.handle, id = %document.id, note, "stored record is inconsistent");
    }
}

fn encode<R: Record>(document: &Document<R>) -> Result<Value, StoreError> {
    serde_json::to_value(&document.record).map_err(|err| StoreError::Corrupt {
        collection: R::SCHEMA.collection.to_string(),
        id: document.id.clone(),
        reason: err.to_string(),
    })
}

fn decode<R: Record>(
    collection: &str,
    id: &RecordId,
    value: Value,
) -> Result<Document<R>, StoreError> {
    serde_json::from_value(value)
        .map(|record| Document::new(id.clone(), record))
        .map_err(|err| StoreError::Corrupt {
            collection: collection.to_string(),
            id: id.clone(),
            reason: err.to_string(),
        })
}

/// Error raised by the society service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Store(_) => None,
        }
    }
}
