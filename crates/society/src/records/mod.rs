//! Record definitions for the society: the fields each document carries, their defaults and
//! enumerations, and the checks that turn an unvalidated draft into a record.

pub mod assignment;
pub mod building;
pub mod complaint;
pub mod notification;
mod role;
pub mod schema;
pub mod validation;
pub mod visitor;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use assignment::{Assignment, AssignmentDraft};
pub use building::{Building, BuildingDraft};
pub use complaint::{Complaint, ComplaintDraft, ComplaintStatus, UserId};
pub use notification::{Notification, NotificationDraft};
pub use role::Role;
pub use schema::{
    DefaultValue, FieldKind, FieldSpec, RecordSchema, SchemaRegistry, TimestampPolicy,
};
pub use validation::{
    screen, settle, Choice, FieldError, Screened, ValidationError, BODY_FIELD,
};
pub use visitor::{Visitor, VisitorDraft, VisitorStatus};

/// Creation and last-update instants carried by every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// Unvalidated input for a record. Every field is optional so omissions can be reported per
/// field instead of failing deserialization.
pub trait Draft: Clone + fmt::Debug + Default + DeserializeOwned + Send + 'static {
    /// Fill every field missing from `self` with the value from `base`.
    fn overlay(self, base: Self) -> Self;
}

/// A persisted record type and the schema describing it.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Draft;

    const SCHEMA: &'static RecordSchema;

    /// Validate a draft, applying schema defaults. `now` stands in for "construction time".
    fn from_draft(draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, ValidationError>;

    /// Draft with every field populated from this record.
    fn to_draft(&self) -> Self::Draft;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// User identity this record points at, if any.
    fn user_reference(&self) -> Option<&UserId> {
        None
    }

    /// Inconsistency worth logging that the schema deliberately does not reject.
    fn advisory(&self) -> Option<&'static str> {
        None
    }
}
