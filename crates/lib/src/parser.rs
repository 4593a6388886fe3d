//! # Structured Response Parser
//!
//! Turns the raw text of a model answer into a `StructuredRecord` validated against a
//! `StructuredSchema`. The checks are field presence, field type, and enum membership.
//! Booleans answered as words are coerced. Any violation is reported as
//! `AnalysisError::SchemaViolation` so the stage can fall back to plain text.

use crate::{
    errors::AnalysisError,
    schema::{FieldSpec, FieldType, StructuredRecord, StructuredSchema},
};
use serde_json::Value;
use tracing::debug;

const TRUE_WORDS: &[&str] = &["true", "right", "yes"];
const FALSE_WORDS: &[&str] = &["false", "wrong", "no"];

/// Maps a textual boolean to its value.
///
/// Matches `true`/`right`/`yes` and `false`/`wrong`/`no`, ignoring case and surrounding
/// whitespace. Returns `None` for anything else.
pub fn coerce_boolean(text: &str) -> Option<bool> {
    let normalized = text.trim().to_lowercase();
    if TRUE_WORDS.contains(&normalized.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Decodes a raw model answer against `schema`.
///
/// The answer may be wrapped in a Markdown code fence or surrounded by prose; the
/// outermost JSON object is used in that case. Fields not declared by the schema are
/// dropped, and the returned record follows the schema's field order.
pub fn decode(raw: &str, schema: &StructuredSchema) -> Result<StructuredRecord, AnalysisError> {
    let object = match extract_json(raw) {
        Some(Value::Object(object)) => object,
        Some(other) => {
            return Err(violation(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
        None => return Err(violation("no JSON object found in response")),
    };

    let mut record = StructuredRecord::new();
    for field in &schema.fields {
        let value = object
            .get(&field.name)
            .ok_or_else(|| violation(format!("missing field '{}'", field.name)))?;
        record.insert(field.name.clone(), check_field(field, value)?);
    }

    let extra: Vec<&String> = object
        .keys()
        .filter(|key| schema.field(key).is_none())
        .collect();
    if !extra.is_empty() {
        debug!(schema = %schema.name, ?extra, "Dropping fields not declared by the schema");
    }

    Ok(record)
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<Value, AnalysisError> {
    match (&field.field_type, value) {
        (FieldType::String, Value::String(_)) => Ok(value.clone()),
        (FieldType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        // Unrecognised words are kept as they are; the verdict still carries signal.
        (FieldType::Boolean, Value::String(text)) => Ok(coerce_boolean(text)
            .map(Value::Bool)
            .unwrap_or_else(|| value.clone())),
        (FieldType::Enum(allowed), Value::String(text)) => canonical_variant(allowed, text)
            .map(Value::String)
            .ok_or_else(|| {
                violation(format!(
                    "value '{text}' of field '{}' is not one of {allowed:?}",
                    field.name
                ))
            }),
        (FieldType::Enum(allowed), Value::Number(number)) if number.is_u64() => {
            let text = number.to_string();
            canonical_variant(allowed, &text)
                .map(Value::String)
                .ok_or_else(|| {
                    violation(format!(
                        "value {text} of field '{}' is not one of {allowed:?}",
                        field.name
                    ))
                })
        }
        (expected, other) => Err(violation(format!(
            "field '{}' expected {}, got {}",
            field.name,
            type_name(expected),
            json_kind(other)
        ))),
    }
}

fn canonical_variant(allowed: &[String], text: &str) -> Option<String> {
    let wanted = text.trim();
    allowed
        .iter()
        .find(|variant| variant.eq_ignore_ascii_case(wanted))
        .cloned()
}

/// Finds the JSON value in a model answer, tolerating code fences and prose.
fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.strip_suffix("```").unwrap_or(rest).trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&unfenced[start..=end]).ok()
}

fn violation(reason: impl Into<String>) -> AnalysisError {
    AnalysisError::SchemaViolation(reason.into())
}

fn type_name(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::String => "a string",
        FieldType::Boolean => "a boolean",
        FieldType::Enum(_) => "an enum value",
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
