//! Ordered-set edits on child id arrays (`Whiteboard.pins`, `Trip.whiteboards`).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::dedup_ids};

/// How a delta of ids is applied to a child id array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Append ids not already present, keeping existing order.
    Add,
    /// Remove every listed id.
    Remove,
    /// Replace the whole array.
    Set,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
        }
    }

    /// Apply `delta` to `current` in place.
    pub fn apply(self, current: &mut Vec<Uuid>, delta: &[Uuid]) {
        match self {
            Self::Add => {
                for id in delta {
                    if !current.contains(id) {
                        current.push(*id);
                    }
                }
            }
            Self::Remove => current.retain(|id| !delta.contains(id)),
            Self::Set => *current = dedup_ids(delta),
        }
    }
}

impl TryFrom<&str> for ChangeType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "set" => Ok(Self::Set),
            other => Err(EngineError::InvalidInput(format!(
                "invalid change type: {other}"
            ))),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
