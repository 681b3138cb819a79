use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::schema::{DefaultValue, FieldSpec, RecordSchema};

/// One offending field and the message describing what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Raised when a draft cannot become a record. Always names at least one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{handle} validation failed: {}", summary(.fields))]
pub struct ValidationError {
    pub handle: &'static str,
    pub fields: Vec<FieldError>,
}

fn summary(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(handle: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            handle,
            fields: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.fields.iter().find(|error| error.field == name)
    }

    pub fn names(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Field name used when the request body as a whole cannot be read.
pub const BODY_FIELD: &str = "body";

/// A raw JSON body split into a typed draft and the fields whose JSON type did not fit.
///
/// Mismatched fields are dropped from the draft so the rest of the body still reaches the
/// per-field checks.
#[derive(Debug)]
pub struct Screened<D> {
    pub draft: D,
    pub mismatched: Vec<FieldError>,
}

pub fn screen<D: DeserializeOwned>(
    schema: &'static RecordSchema,
    body: Value,
) -> Result<Screened<D>, ValidationError> {
    let Value::Object(mut fields) = body else {
        return Err(ValidationError::single(
            schema.handle,
            BODY_FIELD,
            "request body must be a JSON object",
        ));
    };

    let mut mismatched = Vec::new();
    for spec in schema.fields {
        let fits = fields
            .get(spec.name)
            .map_or(true, |value| spec.kind.accepts(value));
        if !fits {
            fields.remove(spec.name);
            mismatched.push(FieldError {
                field: spec.name,
                message: spec.mismatch_message(),
            });
        }
    }

    let draft = serde_json::from_value(Value::Object(fields))
        .map_err(|err| ValidationError::single(schema.handle, BODY_FIELD, err.to_string()))?;
    Ok(Screened { draft, mismatched })
}

/// Fold type mismatches into the outcome of validating the screened draft.
///
/// A dropped field may resurface as "required"; the mismatch wins. Fields are reported in
/// schema order.
pub fn settle<T>(
    schema: &'static RecordSchema,
    mismatched: Vec<FieldError>,
    outcome: Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    if mismatched.is_empty() {
        return outcome;
    }

    let mut fields = mismatched;
    if let Err(error) = outcome {
        for found in error.fields {
            if !fields.iter().any(|known| known.field == found.field) {
                fields.push(found);
            }
        }
    }
    fields.sort_by_key(|error| {
        schema
            .fields
            .iter()
            .position(|spec| spec.name == error.field)
            .unwrap_or(usize::MAX)
    });

    Err(ValidationError {
        handle: schema.handle,
        fields,
    })
}

/// Closed set of string values backing an enumeration field.
pub trait Choice: Sized + Copy + fmt::Debug {
    const LABELS: &'static [&'static str];

    fn from_label(label: &str) -> Option<Self>;

    fn label(self) -> &'static str;
}

/// Collects per-field failures while a draft is converted into a record.
///
/// Every check returns a usable placeholder on failure so callers can keep going and report
/// all offending fields at once; `finish` decides whether the assembled values may be used.
pub(crate) struct FieldCheck {
    schema: &'static RecordSchema,
    errors: Vec<FieldError>,
}

impl FieldCheck {
    pub(crate) fn new(schema: &'static RecordSchema) -> Self {
        Self {
            schema,
            errors: Vec::new(),
        }
    }

    fn spec(&self, field: &'static str) -> FieldSpec {
        self.schema.field(field).copied().unwrap_or(FieldSpec::required(
            field,
            super::schema::FieldKind::Text,
        ))
    }

    fn reject(&mut self, field: &'static str, message: String) {
        self.errors.push(FieldError { field, message });
    }

    pub(crate) fn reject_invalid(&mut self, field: &'static str) {
        let message = self.spec(field).invalid_message();
        self.reject(field, message);
    }

    fn reject_missing(&mut self, field: &'static str) {
        let message = self.spec(field).required_message();
        self.reject(field, message);
    }

    /// Text field. Blank input counts as absent; present values are kept verbatim.
    pub(crate) fn text(&mut self, field: &'static str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.trim().is_empty() => value,
            Some(value) if !self.spec(field).required => value,
            _ => match self.spec(field) {
                spec if spec.required => {
                    self.reject_missing(field);
                    String::new()
                }
                spec => match spec.default {
                    Some(DefaultValue::Text(text)) => text.to_string(),
                    _ => String::new(),
                },
            },
        }
    }

    /// Enumeration field. Omitted values fall back to the schema default when there is one.
    pub(crate) fn choice<C: Choice + Default>(
        &mut self,
        field: &'static str,
        value: Option<String>,
    ) -> C {
        let spec = self.spec(field);
        let label = match value {
            Some(value) => value,
            None => match spec.default {
                Some(DefaultValue::Text(text)) => text.to_string(),
                _ => {
                    self.reject_missing(field);
                    return C::default();
                }
            },
        };

        match C::from_label(&label) {
            Some(choice) => choice,
            None => {
                self.reject_invalid(field);
                C::default()
            }
        }
    }

    /// Whole, non-negative number. Numeric strings are cast the way a document store would.
    pub(crate) fn whole_number(&mut self, field: &'static str, value: Option<Value>) -> u32 {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.reject_missing(field);
                return 0;
            }
            Some(Value::String(raw)) if raw.trim().is_empty() => {
                self.reject_missing(field);
                return 0;
            }
            Some(Value::String(raw)) => raw.trim().parse::<u32>().ok(),
            Some(Value::Number(number)) => number
                .as_u64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|value| value.fract() == 0.0 && *value >= 0.0)
                        .map(|value| value as u64)
                })
                .and_then(|value| u32::try_from(value).ok()),
            Some(_) => None,
        };

        match parsed {
            Some(value) => value,
            None => {
                self.reject_invalid(field);
                0
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                handle: self.schema.handle,
                fields: self.errors,
            })
        }
    }
}
