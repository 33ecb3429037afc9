//! Unwrapping of VK API response envelopes.
//!
//! A call answers either `{"response": ...}` or `{"error": {"error_code",
//! "error_msg", ...}}`.

use lr_core::RawRecord;
use serde_json::Value;

use crate::FetchError;

pub fn parse_envelope(body: &str) -> Result<Value, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("body is not JSON: {e}")))?;
    unwrap_envelope(value)
}

pub fn unwrap_envelope(mut value: Value) -> Result<Value, FetchError> {
    if let Some(err) = value.get("error") {
        return Err(FetchError::Api {
            code: err.get("error_code").and_then(Value::as_i64).unwrap_or(-1),
            message: err
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    value
        .get_mut("response")
        .map(Value::take)
        .ok_or_else(|| FetchError::Malformed("missing `response`".into()))
}

/// `response.items` as records.
pub fn items(response: Value) -> Result<Vec<RawRecord>, FetchError> {
    let Value::Object(mut fields) = response else {
        return Err(FetchError::Malformed("`response` is not an object".into()));
    };
    let Some(Value::Array(items)) = fields.remove("items") else {
        return Err(FetchError::Malformed("missing `response.items`".into()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            RawRecord::from_value(item)
                .ok_or_else(|| FetchError::Malformed(format!("item {i} is not an object")))
        })
        .collect()
}

/// The `description` of the first group in a `groups.getById` response.
///
/// Older API versions answer with a bare array, newer ones wrap it in `groups`.
pub fn group_description(response: &Value) -> Result<String, FetchError> {
    let groups = match response {
        Value::Array(_) => response,
        _ => response
            .get("groups")
            .ok_or_else(|| FetchError::Malformed("missing `groups`".into()))?,
    };
    groups
        .get(0)
        .ok_or_else(|| FetchError::Malformed("no group in response".into()))?
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| FetchError::Malformed("group has no `description`".into()))
}
