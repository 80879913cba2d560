//! Canonical form of the `extracted_data` field returned by the agents.
//!
//! The backend sends either a JSON object or a string holding a JSON object.
//! Both are resolved once, at ingestion, into [`ExtractedData`], which keeps
//! the document order of the keys so the confirmation dialog lists fields the
//! way the backend produced them.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractedDataError {
    #[error("extracted data is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("extracted data must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedData {
    fields: Map<String, Value>,
    /// Keys offered for confirmation, fixed when the data is ingested.
    editable: Vec<String>,
}

/// One editable row of the confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRow {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl ExtractedData {
    pub fn from_payload(payload: &Value) -> Result<Self, ExtractedDataError> {
        match payload {
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text)
                    .map_err(|err| ExtractedDataError::InvalidJson(err.to_string()))?;
                match parsed {
                    Value::Object(fields) => Ok(Self::from_fields(fields)),
                    other => Err(ExtractedDataError::NotAnObject(json_kind(&other))),
                }
            }
            Value::Object(fields) => Ok(Self::from_fields(fields.clone())),
            other => Err(ExtractedDataError::NotAnObject(json_kind(other))),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> Self {
        let editable = fields
            .iter()
            .filter(|(_, value)| is_present(value))
            .map(|(key, _)| key.clone())
            .collect();
        Self { fields, editable }
    }

    /// Fields shown for confirmation: every key whose value was set on arrival.
    pub fn rows(&self) -> Vec<ConfirmationRow> {
        self.editable
            .iter()
            .filter_map(|key| {
                self.fields.get(key).map(|value| ConfirmationRow {
                    key: key.clone(),
                    label: humanize_key(key),
                    value: display_value(value),
                })
            })
            .collect()
    }

    /// Replaces the value of a displayed field. Returns `false` for keys that
    /// are not part of the dialog.
    pub fn edit(&mut self, key: &str, value: impl Into<String>) -> bool {
        if !self.editable.iter().any(|editable| editable == key) {
            return false;
        }
        match self.fields.get_mut(key) {
            Some(slot) => {
                *slot = Value::String(value.into());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

/// JSON truthiness: null, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A field counts as extracted when it is truthy and not the literal `"null"`.
fn is_present(value: &Value) -> bool {
    is_truthy(value) && value.as_str() != Some("null")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `leave_start_date` -> `Leave Start Date`.
pub fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_boundary = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_ascii_alphanumeric() {
            if at_boundary {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
            at_boundary = false;
        } else {
            out.push(ch);
            at_boundary = true;
        }
    }
    out
}
