/// Shared payload validation helpers
///
/// Request bodies arrive as loose JSON so that shape errors (a missing field,
/// a number where a string belongs, `tags` that is not a list) can be reported
/// as a `ValidationError` naming the field instead of a generic decode failure.
use serde_json::{Map, Value};
use thiserror::Error;

/// A payload failed the rules for the operation it was sent to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

pub type Payload = Map<String, Value>;

/// Require the request body to be a JSON object
pub fn as_object(value: &Value) -> Result<&Payload, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::new("Request body must be a JSON object."))
}

/// A present, non-empty string. Missing, null, empty and non-string values all
/// fail with `message`.
pub fn required_string<'a>(
    payload: &'a Payload,
    field: &str,
    message: &str,
) -> Result<&'a str, ValidationError> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.as_str()),
        _ => Err(ValidationError::field(field, message)),
    }
}

/// An optional string. Absent and null are `None`; anything else must be a string.
pub fn optional_string<'a>(
    payload: &'a Payload,
    field: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::field(
            field,
            format!("{} must be a string.", capitalize(field)),
        )),
    }
}

/// Tags default to an empty list; when present they must be an array of strings.
pub fn tag_list(payload: &Payload) -> Result<Vec<String>, ValidationError> {
    match payload.get("tags") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::field("tags", "Tags must be an array of strings."))
            })
            .collect(),
        Some(_) => Err(ValidationError::field("tags", "Tags must be an array.")),
    }
}

/// `Some` only when the field holds a JSON boolean; other values are ignored.
pub fn optional_bool(payload: &Payload, field: &str) -> Option<bool> {
    payload.get(field).and_then(Value::as_bool)
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
