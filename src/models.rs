use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reads the `title` field of a create or rename body and returns it trimmed.
pub fn parse_title(body: &[u8]) -> Result<String, ApiError> {
    let fields = parse_object(body)?;
    match fields.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => Ok(title.trim().to_string()),
        _ => Err(ApiError::Validation("title is required")),
    }
}

/// Reads the `is_done` field of a toggle body. Only a JSON boolean is accepted.
pub fn parse_toggle(body: &[u8]) -> Result<bool, ApiError> {
    let fields = parse_object(body)?;
    match fields.get("is_done") {
        Some(Value::Bool(is_done)) => Ok(*is_done),
        _ => Err(ApiError::Validation("is_done must be a boolean")),
    }
}

fn parse_object(body: &[u8]) -> Result<serde_json::Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(ApiError::MalformedBody(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
        Err(err) => Err(ApiError::MalformedBody(err.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Path ids are opaque text; anything that is not a row id cannot match a record.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}
