use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{FieldKind, FieldSpec, RecordSchema, TimestampPolicy};
use super::validation::{FieldCheck, ValidationError};
use super::{Draft, Record, Timestamps};

/// Physical building within the society.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub building_name: String,
    pub building_number: String,
    pub number_of_flats: u32,
    pub location: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// `number_of_flats` stays loosely typed so a non-numeric value surfaces as a field error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDraft {
    pub building_name: Option<String>,
    pub building_number: Option<String>,
    pub number_of_flats: Option<Value>,
    pub location: Option<String>,
}

impl Draft for BuildingDraft {
    fn overlay(self, base: Self) -> Self {
        Self {
            building_name: self.building_name.or(base.building_name),
            building_number: self.building_number.or(base.building_number),
            number_of_flats: self.number_of_flats.or(base.number_of_flats),
            location: self.location.or(base.location),
        }
    }
}

impl Record for Building {
    type Draft = BuildingDraft;

    const SCHEMA: &'static RecordSchema = &RecordSchema {
        handle: "Building",
        collection: "buildings",
        timestamps: TimestampPolicy::Automatic,
        fields: &[
            FieldSpec::required("buildingName", FieldKind::Text)
                .with_required_message("Building name is required"),
            FieldSpec::required("buildingNumber", FieldKind::Text)
                .with_required_message("Building number is required"),
            FieldSpec::required("numberOfFlats", FieldKind::Number)
                .with_required_message("Number of flats is required")
                .with_invalid_message("Number of flats must be a number"),
            FieldSpec::required("location", FieldKind::Text)
                .with_required_message("Location is required"),
        ],
    };

    fn from_draft(draft: BuildingDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut check = FieldCheck::new(Self::SCHEMA);
        let building_name = check.text("buildingName", draft.building_name);
        let building_number = check.text("buildingNumber", draft.building_number);
        let number_of_flats = check.whole_number("numberOfFlats", draft.number_of_flats);
        let location = check.text("location", draft.location);
        check.finish()?;

        Ok(Self {
            building_name,
            building_number,
            number_of_flats,
            location,
            timestamps: Timestamps::at(now),
        })
    }

    fn to_draft(&self) -> BuildingDraft {
        BuildingDraft {
            building_name: Some(self.building_name.clone()),
            building_number: Some(self.building_number.clone()),
            number_of_flats: Some(Value::from(self.number_of_flats)),
            location: Some(self.location.clone()),
        }
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}
