//! Query-string flattening for list filters
//!
//! List screens send nested filter objects. They are flattened the way the
//! backend's query parser expects: nested keys joined with `.`, array items
//! addressed as `[i]`, `null` sent as an empty value. Empty arrays and
//! objects produce no pairs.

use serde_json::Value;
use url::form_urlencoded;

use super::errors::ApiError;

/// Flatten a JSON object into ordered `(key, value)` pairs.
///
/// # Errors
/// Returns `ApiError::InvalidRequest` when `query` is neither an object nor
/// `null`.
pub fn flatten(query: &Value) -> Result<Vec<(String, String)>, ApiError> {
    let mut pairs = Vec::new();

    match query {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                push_pairs(key.clone(), value, &mut pairs);
            }
        }
        other => {
            return Err(ApiError::InvalidRequest(format!(
                "query must be an object, got {}",
                kind(other)
            )))
        }
    }

    Ok(pairs)
}

/// Encode a query object as `application/x-www-form-urlencoded` text.
///
/// # Errors
/// Same as [`flatten`].
pub fn to_query_string(query: &Value) -> Result<String, ApiError> {
    let pairs = flatten(query)?;
    Ok(form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish())
}

fn push_pairs(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => pairs.push((prefix, String::new())),
        Value::Bool(flag) => pairs.push((prefix, flag.to_string())),
        Value::Number(number) => pairs.push((prefix, number.to_string())),
        Value::String(text) => pairs.push((prefix, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(format!("{prefix}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                push_pairs(format!("{prefix}.{key}"), nested, pairs);
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
