//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. Child references are
//! persisted as JSON arrays of ids, so the (de)serialization lives here.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Encode a list column.
pub(crate) fn to_json<T: Serialize>(value: &T, label: &str) -> ResultEngine<String> {
    serde_json::to_string(value)
        .map_err(|err| EngineError::InvalidInput(format!("cannot encode {label}: {err}")))
}

/// Decode a list column written by [`to_json`].
pub(crate) fn from_json<T: DeserializeOwned>(value: &str, label: &str) -> ResultEngine<T> {
    serde_json::from_str(value)
        .map_err(|err| EngineError::InvalidInput(format!("stored {label} is corrupt: {err}")))
}

/// Stringify ids for `IN (...)` filters.
pub(crate) fn id_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

/// Drop duplicates while keeping the first occurrence of each id.
pub(crate) fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
