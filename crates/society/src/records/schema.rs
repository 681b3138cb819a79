use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{Assignment, Building, Complaint, Notification, Record, Visitor};

/// How `createdAt`/`updatedAt` behave once a record has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// The data-access layer refreshes `updatedAt` on every update.
    Automatic,
    /// Timestamps are ordinary fields; only an explicit value changes them.
    Manual,
}

/// Semantic type of a field as declared in a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Reference { target: &'static str },
    Enumeration { values: &'static [&'static str] },
    TextList,
}

impl FieldKind {
    /// Whether a JSON value has a shape this kind can be read from. `null` reads as omitted.
    ///
    /// Numbers are left to the whole-number check, which also accepts numeric strings.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (FieldKind::Number, _) => true,
            (
                FieldKind::Text | FieldKind::Reference { .. } | FieldKind::Enumeration { .. },
                Value::String(_),
            ) => true,
            (FieldKind::Date, Value::String(raw)) => raw.parse::<DateTime<Utc>>().is_ok(),
            (FieldKind::TextList, Value::Array(items)) => items.iter().all(Value::is_string),
            _ => false,
        }
    }
}

/// Value substituted when an optional field is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Text(&'static str),
    Now,
    Null,
    EmptyList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_message: Option<&'static str>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            required_message: None,
            invalid_message: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, default: DefaultValue) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: Some(default),
            required_message: None,
            invalid_message: None,
        }
    }

    pub const fn with_required_message(self, message: &'static str) -> Self {
        Self {
            required_message: Some(message),
            ..self
        }
    }

    pub const fn with_invalid_message(self, message: &'static str) -> Self {
        Self {
            invalid_message: Some(message),
            ..self
        }
    }

    pub fn required_message(&self) -> String {
        match self.required_message {
            Some(message) => message.to_string(),
            None => format!("{} is required", self.name),
        }
    }

    pub fn invalid_message(&self) -> String {
        if let Some(message) = self.invalid_message {
            return message.to_string();
        }

        match self.kind {
            FieldKind::Enumeration { values } => {
                format!("{} must be one of: {}", self.name, values.join(", "))
            }
            FieldKind::Number => format!("{} must be a number", self.name),
            FieldKind::Date => format!("{} must be a timestamp", self.name),
            FieldKind::Reference { target } => {
                format!("{} does not reference an existing {}", self.name, target)
            }
            FieldKind::Text | FieldKind::TextList => format!("{} is invalid", self.name),
        }
    }

    /// Message for a value whose JSON type does not fit the field at all.
    pub fn mismatch_message(&self) -> String {
        match self.kind {
            FieldKind::Text | FieldKind::Reference { .. } => format!("{} must be text", self.name),
            FieldKind::TextList => format!("{} must be a list of text", self.name),
            _ => self.invalid_message(),
        }
    }
}

/// Named, typed definition of one persisted record type.
#[derive(Debug, Serialize)]
pub struct RecordSchema {
    pub handle: &'static str,
    pub collection: &'static str,
    pub timestamps: TimestampPolicy,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
    }
}

/// Mapping from handle name (`Flat`, `Visitor`, ...) to schema.
///
/// Built once at startup and handed to whoever needs to resolve a handle; nothing registers
/// itself globally.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<&'static str, &'static RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the five society record types.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register::<Assignment>()
            .register::<Building>()
            .register::<Complaint>()
            .register::<Notification>()
            .register::<Visitor>();
        registry
    }

    pub fn register<R: Record>(&mut self) -> &mut Self {
        self.schemas.insert(R::SCHEMA.handle, R::SCHEMA);
        self
    }

    pub fn get(&self, handle: &str) -> Option<&'static RecordSchema> {
        self.schemas.get(handle).copied()
    }

    pub fn by_collection(&self, collection: &str) -> Option<&'static RecordSchema> {
        self.schemas
            .values()
            .copied()
            .find(|schema| schema.collection == collection)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &'static RecordSchema> + '_ {
        self.schemas.values().copied()
    }

    pub fn handles(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemas.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
