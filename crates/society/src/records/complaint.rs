use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{DefaultValue, FieldKind, FieldSpec, RecordSchema, TimestampPolicy};
use super::validation::{Choice, FieldCheck, ValidationError};
use super::{Draft, Record, Timestamps};

/// Identity of a user held outside this crate. Whether it exists is for the data-access layer
/// to decide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a complaint stands. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const LABELS: &'static [&'static str] = &["Pending", "In Progress", "Resolved", "Rejected"];

    pub const fn ordered() -> [Self; 4] {
        [
            Self::Pending,
            Self::InProgress,
            Self::Resolved,
            Self::Rejected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

impl Choice for ComplaintStatus {
    const LABELS: &'static [&'static str] = ComplaintStatus::LABELS;

    fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == label)
    }

    fn label(self) -> &'static str {
        ComplaintStatus::label(self)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resident's complaint and the running comment log attached to it.
///
/// Timestamps are plain fields here: they are set once at construction and only move when a
/// caller supplies new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub user_id: UserId,
    pub complaint: String,
    pub status: ComplaintStatus,
    pub comments: Vec<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Complaint {
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            ComplaintStatus::Pending | ComplaintStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDraft {
    pub user_id: Option<String>,
    pub complaint: Option<String>,
    pub status: Option<String>,
    pub comments: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Draft for ComplaintDraft {
    fn overlay(self, base: Self) -> Self {
        Self {
            user_id: self.user_id.or(base.user_id),
            complaint: self.complaint.or(base.complaint),
            status: self.status.or(base.status),
            comments: self.comments.or(base.comments),
            created_at: self.created_at.or(base.created_at),
            updated_at: self.updated_at.or(base.updated_at),
        }
    }
}

impl Record for Complaint {
    type Draft = ComplaintDraft;

    const SCHEMA: &'static RecordSchema = &RecordSchema {
        handle: "Complaint",
        collection: "complaints",
        timestamps: TimestampPolicy::Manual,
        fields: &[
            FieldSpec::required("userId", FieldKind::Reference { target: "User" }),
            FieldSpec::required("complaint", FieldKind::Text),
            FieldSpec::optional(
                "status",
                FieldKind::Enumeration {
                    values: ComplaintStatus::LABELS,
                },
                DefaultValue::Text("Pending"),
            ),
            FieldSpec::optional("comments", FieldKind::TextList, DefaultValue::EmptyList),
            FieldSpec::optional("createdAt", FieldKind::Date, DefaultValue::Now),
            FieldSpec::optional("updatedAt", FieldKind::Date, DefaultValue::Now),
        ],
    };

    fn from_draft(draft: ComplaintDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut check = FieldCheck::new(Self::SCHEMA);
        let user_id = check.text("userId", draft.user_id);
        let complaint = check.text("complaint", draft.complaint);
        let status = check.choice::<ComplaintStatus>("status", draft.status);
        check.finish()?;

        Ok(Self {
            user_id: UserId(user_id),
            complaint,
            status,
            comments: draft.comments.unwrap_or_default(),
            timestamps: Timestamps {
                created_at: draft.created_at.unwrap_or(now),
                updated_at: draft.updated_at.unwrap_or(now),
            },
        })
    }

    fn to_draft(&self) -> ComplaintDraft {
        ComplaintDraft {
            user_id: Some(self.user_id.0.clone()),
            complaint: Some(self.complaint.clone()),
            status: Some(self.status.label().to_string()),
            comments: Some(self.comments.clone()),
            created_at: Some(self.timestamps.created_at),
            updated_at: Some(self.timestamps.updated_at),
        }
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn user_reference(&self) -> Option<&UserId> {
        Some(&self.user_id)
    }
}
