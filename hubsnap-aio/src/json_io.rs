// hubsnap-aio/src/json_io.rs
use std::path::Path;

use hubsnap_common::error::{HubError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::debug;

/// Asynchronously reads and deserializes data from a JSON file.
pub async fn read_json_async<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Async Reading JSON from: {}", path.display());
    let json_bytes = fs::read(path)
        .await
        .map_err(|e| HubError::filesystem(path, e))?;

    serde_json::from_slice(&json_bytes)
        .map_err(|e| HubError::Parse(format!("{}: {}", path.display(), e)))
}

/// Reads a downloaded configuration file (e.g. `config.json`) as a loosely typed JSON object.
pub async fn read_json_object_async(path: &Path) -> Result<Map<String, Value>> {
    match read_json_async::<Value>(path).await? {
        Value::Object(map) => Ok(map),
        other => Err(HubError::Parse(format!(
            "{}: expected a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
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
