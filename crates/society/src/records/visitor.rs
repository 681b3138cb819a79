use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{DefaultValue, FieldKind, FieldSpec, RecordSchema, TimestampPolicy};
use super::validation::{Choice, FieldCheck, ValidationError};
use super::{Draft, Record, Timestamps};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitorStatus {
    #[default]
    CheckedIn,
    CheckedOut,
}

impl VisitorStatus {
    pub const LABELS: &'static [&'static str] = &["checked-in", "checked-out"];

    pub const fn label(self) -> &'static str {
        match self {
            Self::CheckedIn => "checked-in",
            Self::CheckedOut => "checked-out",
        }
    }
}

impl Choice for VisitorStatus {
    const LABELS: &'static [&'static str] = VisitorStatus::LABELS;

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "checked-in" => Some(Self::CheckedIn),
            "checked-out" => Some(Self::CheckedOut),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        VisitorStatus::label(self)
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One visit to a flat, from gate entry to departure.
///
/// `status` and `check_out` are independent fields. Nothing here requires a checked-out visitor
/// to carry a departure time, or the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub visitor_name: String,
    pub flat_number: String,
    pub visitor_phone_number: String,
    pub purpose: String,
    pub building_number: String,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: VisitorStatus,
    pub additional_notes: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Visitor {
    /// Whether `status` and `check_out` tell the same story.
    pub fn departure_consistent(&self) -> bool {
        match self.status {
            VisitorStatus::CheckedIn => self.check_out.is_none(),
            VisitorStatus::CheckedOut => self.check_out.is_some(),
        }
    }
}

/// `check_out` only ever sets a departure time; a null in an update leaves the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorDraft {
    pub visitor_name: Option<String>,
    pub flat_number: Option<String>,
    pub visitor_phone_number: Option<String>,
    pub purpose: Option<String>,
    pub building_number: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub additional_notes: Option<String>,
}

impl Draft for VisitorDraft {
    fn overlay(self, base: Self) -> Self {
        Self {
            visitor_name: self.visitor_name.or(base.visitor_name),
            flat_number: self.flat_number.or(base.flat_number),
            visitor_phone_number: self.visitor_phone_number.or(base.visitor_phone_number),
            purpose: self.purpose.or(base.purpose),
            building_number: self.building_number.or(base.building_number),
            check_in: self.check_in.or(base.check_in),
            check_out: self.check_out.or(base.check_out),
            status: self.status.or(base.status),
            additional_notes: self.additional_notes.or(base.additional_notes),
        }
    }
}

impl Record for Visitor {
    type Draft = VisitorDraft;

    const SCHEMA: &'static RecordSchema = &RecordSchema {
        handle: "Visitor",
        collection: "visitors",
        timestamps: TimestampPolicy::Automatic,
        fields: &[
            FieldSpec::required("visitorName", FieldKind::Text),
            FieldSpec::required("flatNumber", FieldKind::Text),
            FieldSpec::required("visitorPhoneNumber", FieldKind::Text),
            FieldSpec::required("purpose", FieldKind::Text),
            FieldSpec::required("buildingNumber", FieldKind::Text),
            FieldSpec::optional("checkIn", FieldKind::Date, DefaultValue::Now),
            FieldSpec::optional("checkOut", FieldKind::Date, DefaultValue::Null),
            FieldSpec::optional(
                "status",
                FieldKind::Enumeration {
                    values: VisitorStatus::LABELS,
                },
                DefaultValue::Text("checked-in"),
            ),
            FieldSpec::optional("additionalNotes", FieldKind::Text, DefaultValue::Text("")),
        ],
    };

    fn from_draft(draft: VisitorDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut check = FieldCheck::new(Self::SCHEMA);
        let visitor_name = check.text("visitorName", draft.visitor_name);
        let flat_number = check.text("flatNumber", draft.flat_number);
        let visitor_phone_number = check.text("visitorPhoneNumber", draft.visitor_phone_number);
        let purpose = check.text("purpose", draft.purpose);
        let building_number = check.text("buildingNumber", draft.building_number);
        let status = check.choice::<VisitorStatus>("status", draft.status);
        let additional_notes = check.text("additionalNotes", draft.additional_notes);
        check.finish()?;

        Ok(Self {
            visitor_name,
            flat_number,
            visitor_phone_number,
            purpose,
            building_number,
            check_in: draft.check_in.unwrap_or(now),
            check_out: draft.check_out,
            status,
            additional_notes,
            timestamps: Timestamps::at(now),
        })
    }

    fn to_draft(&self) -> VisitorDraft {
        VisitorDraft {
            visitor_name: Some(self.visitor_name.clone()),
            flat_number: Some(self.flat_number.clone()),
            visitor_phone_number: Some(self.visitor_phone_number.clone()),
            purpose: Some(self.purpose.clone()),
            building_number: Some(self.building_number.clone()),
            check_in: Some(self.check_in),
            check_out: self.check_out,
            status: Some(self.status.label().to_string()),
            additional_notes: Some(self.additional_notes.clone()),
        }
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn advisory(&self) -> Option<&'static str> {
        if self.departure_consistent() {
            None
        } else {
            Some("visitor status and checkOut disagree")
        }
    }
}
