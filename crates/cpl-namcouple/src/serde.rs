use std::collections::BTreeMap;
use std::iter::FromIterator;

use cpl_core::errors::{CplError, ErrorInfo, FatalKind};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(kind: FatalKind, code: &str, err: impl ToString) -> CplError {
    CplError::from_info(
        kind,
        ErrorInfo::new(kind.code(), err.to_string()).with_context("stage", code),
    )
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CplError> {
    let value = serde_json::to_value(value)
        .map_err(|err| serde_error(FatalKind::OutputIo, "json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical)
        .map_err(|err| serde_error(FatalKind::OutputIo, "json_write", err))?;
    Ok(bytes)
}

/// Deserializes a JSON payload into the requested type.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CplError> {
    serde_json::from_slice(data)
        .map_err(|err| serde_error(FatalKind::RunInfoInvalid, "json_deserialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, CplError> {
    serde_yaml::from_slice(data)
        .map_err(|err| serde_error(FatalKind::RunInfoInvalid, "yaml_deserialize", err))
}
