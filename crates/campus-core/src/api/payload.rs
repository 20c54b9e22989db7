//! Response body decoding.
//!
//! Endpoints answer either with the bare payload or wrapped as
//! `{"success": true, "data": ...}`. Both decode to the same type.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keys that may sit next to `data` in a response envelope
const ENVELOPE_KEYS: [&str; 6] = ["data", "success", "message", "meta", "pagination", "total"];

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data")
                && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str())) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).context("Response body is not valid JSON")?
    };
    Ok(serde_json::from_value(unwrap_envelope(value))?)
}
