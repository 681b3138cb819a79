use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{FieldKind, FieldSpec, RecordSchema, TimestampPolicy};
use super::validation::{FieldCheck, ValidationError};
use super::{Draft, Record, Role, Timestamps};

/// Broadcast message posted to the society. Delivery happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub name: String,
    pub role: Role,
    pub title: String,
    pub message: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub name: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl Draft for NotificationDraft {
    fn overlay(self, base: Self) -> Self {
        Self {
            name: self.name.or(base.name),
            role: self.role.or(base.role),
            title: self.title.or(base.title),
            message: self.message.or(base.message),
        }
    }
}

impl Record for Notification {
    type Draft = NotificationDraft;

    const SCHEMA: &'static RecordSchema = &RecordSchema {
        handle: "Notification",
        collection: "notifications",
        timestamps: TimestampPolicy::Automatic,
        fields: &[
            FieldSpec::required("name", FieldKind::Text),
            FieldSpec::required(
                "role",
                FieldKind::Enumeration {
                    values: Role::LABELS,
                },
            ),
            FieldSpec::required("title", FieldKind::Text),
            FieldSpec::required("message", FieldKind::Text),
        ],
    };

    fn from_draft(draft: NotificationDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut check = FieldCheck::new(Self::SCHEMA);
        let name = check.text("name", draft.name);
        let role = check.choice::<Role>("role", draft.role);
        let title = check.text("title", draft.title);
        let message = check.text("message", draft.message);
        check.finish()?;

        Ok(Self {
            name,
            role,
            title,
            message,
            timestamps: Timestamps::at(now),
        })
    }

    fn to_draft(&self) -> NotificationDraft {
        NotificationDraft {
            name: Some(self.name.clone()),
            role: Some(self.role.label().to_string()),
            title: Some(self.title.clone()),
            message: Some(self.message.clone()),
        }
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NotificationDraft {
        NotificationDraft {
            name: Some("Meera Iyer".to_string()),
            role: Some("president".to_string()),
            title: Some("Water supply".to_string()),
            message: Some("Tanks will be cleaned on Sunday morning.".to_string()),
        }
    }

    #[test]
    fn valid_draft_echoes_fields() {
        let record = Notification::from_draft(draft(), Utc::now()).expect("valid notification");
        assert_eq!(record.name, "Meera Iyer");
        assert_eq!(record.role, Role::President);
        assert_eq!(record.title, "Water supply");
        assert_eq!(record.message, "Tanks will be cleaned on Sunday morning.");
    }

    #[test]
    fn role_is_mandatory() {
        let mut input = draft();
        input.role = None;
        let error = Notification::from_draft(input, Utc::now()).expect_err("rejected");
        assert_eq!(
            error.field("role").map(|e| e.message.as_str()),
            Some("role is required")
        );
    }

    #[test]
    fn role_outside_enumeration_is_rejected() {
        let mut input = draft();
        input.role = Some("secretary".to_string());
        let error = Notification::from_draft(input, Utc::now()).expect_err("rejected");
        assert!(error.names("role"));
    }

    #[test]
    fn each_missing_text_field_is_named() {
        for field in ["name", "title", "message"] {
            let mut input = draft();
            match field {
                "name" => input.name = None,
                "title" => input.title = None,
                _ => input.message = None,
            }
            let error = Notification::from_draft(input, Utc::now()).expect_err("rejected");
            assert_eq!(error.fields.len(), 1);
            assert!(error.names(field), "{field} should be reported");
        }
    }
}
