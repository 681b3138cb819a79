use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{DefaultValue, FieldKind, FieldSpec, RecordSchema, TimestampPolicy};
use super::validation::{FieldCheck, ValidationError};
use super::{Draft, Record, Role, Timestamps};

/// A resident placed in a flat of a building, stored under the `Flat` handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub resident_name: String,
    pub flat_number: String,
    pub building_name: String,
    pub role: Role,
    pub resident_number: String,
    pub resident_email: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub resident_name: Option<String>,
    pub flat_number: Option<String>,
    pub building_name: Option<String>,
    pub role: Option<String>,
    pub resident_number: Option<String>,
    pub resident_email: Option<String>,
}

impl Draft for AssignmentDraft {
    fn overlay(self, base: Self) -> Self {
        Self {
            resident_name: self.resident_name.or(base.resident_name),
            flat_number: self.flat_number.or(base.flat_number),
            building_name: self.building_name.or(base.building_name),
            role: self.role.or(base.role),
            resident_number: self.resident_number.or(base.resident_number),
            resident_email: self.resident_email.or(base.resident_email),
        }
    }
}

impl Record for Assignment {
    type Draft = AssignmentDraft;

    const SCHEMA: &'static RecordSchema = &RecordSchema {
        handle: "Flat",
        collection: "flats",
        timestamps: TimestampPolicy::Automatic,
        fields: &[
            FieldSpec::required("residentName", FieldKind::Text),
            FieldSpec::required("flatNumber", FieldKind::Text),
            FieldSpec::required("buildingName", FieldKind::Text),
            FieldSpec::optional(
                "role",
                FieldKind::Enumeration {
                    values: Role::LABELS,
                },
                DefaultValue::Text("resident"),
            ),
            FieldSpec::required("residentNumber", FieldKind::Text),
            FieldSpec::required("residentEmail", FieldKind::Text),
        ],
    };

    fn from_draft(draft: AssignmentDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut check = FieldCheck::new(Self::SCHEMA);
        let resident_name = check.text("residentName", draft.resident_name);
        let flat_number = check.text("flatNumber", draft.flat_number);
        let building_name = check.text("buildingName", draft.building_name);
        let role = check.choice::<Role>("role", draft.role);
        let resident_number = check.text("residentNumber", draft.resident_number);
        let resident_email = check.text("residentEmail", draft.resident_email);
        check.finish()?;

        Ok(Self {
            resident_name,
            flat_number,
            building_name,
            role,
            resident_number,
            resident_email,
            timestamps: Timestamps::at(now),
        })
    }

    fn to_draft(&self) -> AssignmentDraft {
        AssignmentDraft {
            resident_name: Some(self.resident_name.clone()),
            flat_number: Some(self.flat_number.clone()),
            building_name: Some(self.building_name.clone()),
            role: Some(self.role.label().to_string()),
            resident_number: Some(self.resident_number.clone()),
            resident_email: Some(self.resident_email.clone()),
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
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid instant")
    }

    fn draft() -> AssignmentDraft {
        AssignmentDraft {
            resident_name: Some("Asha Rao".to_string()),
            flat_number: Some("12B".to_string()),
            building_name: Some("Lotus".to_string()),
            role: None,
            resident_number: Some("555-0142".to_string()),
            resident_email: Some("asha@example.com".to_string()),
        }
    }

    #[test]
    fn valid_draft_echoes_fields_and_defaults_role() {
        let record = Assignment::from_draft(draft(), now()).expect("valid assignment");
        assert_eq!(record.resident_name, "Asha Rao");
        assert_eq!(record.flat_number, "12B");
        assert_eq!(record.building_name, "Lotus");
        assert_eq!(record.resident_number, "555-0142");
        assert_eq!(record.resident_email, "asha@example.com");
        assert_eq!(record.role, Role::Resident);
        assert_eq!(record.timestamps, Timestamps::at(now()));
    }

    #[test]
    fn every_enumerated_role_is_accepted() {
        for role in Role::ordered() {
            let mut input = draft();
            input.role = Some(role.label().to_string());
            let record = Assignment::from_draft(input, now()).expect("role accepted");
            assert_eq!(record.role, role);
        }
    }

    #[test]
    fn unknown_role_fails_naming_role() {
        let mut input = draft();
        input.role = Some("treasurer".to_string());
        let error = Assignment::from_draft(input, now()).expect_err("role rejected");
        assert_eq!(error.handle, "Flat");
        assert_eq!(error.fields.len(), 1);
        assert!(error.names("role"));
    }

    #[test]
    fn each_missing_mandatory_field_is_named() {
        let cases: [(&str, fn(&mut AssignmentDraft)); 5] = [
            ("residentName", |d| d.resident_name = None),
            ("flatNumber", |d| d.flat_number = None),
            ("buildingName", |d| d.building_name = None),
            ("residentNumber", |d| d.resident_number = None),
            ("residentEmail", |d| d.resident_email = Some(String::new())),
        ];

        for (field, strip) in cases {
            let mut input = draft();
            strip(&mut input);
            let error = Assignment::from_draft(input, now()).expect_err("missing field");
            assert!(error.names(field), "{field} should be reported: {error}");
            assert_eq!(error.fields.len(), 1);
        }
    }

    #[test]
    fn wire_format_uses_camel_case_names() {
        let record = Assignment::from_draft(draft(), now()).expect("valid assignment");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["residentName"], "Asha Rao");
        assert_eq!(value["role"], "resident");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
