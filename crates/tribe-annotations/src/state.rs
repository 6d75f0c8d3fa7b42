//! Where a publication currently sits relative to the baseline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tribe_common::TribeError;

/// Badge shown next to a publication, and the state a removal starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubState {
    /// Attached during this session; not in the baseline.
    Added,
    /// Detached during this session; parked until restored.
    Removed,
    /// Present in the working set without an added/removed mark.
    Current,
}

impl PubState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PubState::Added   => "added",
            PubState::Removed => "removed",
            PubState::Current => "current",
        }
    }
}

impl fmt::Display for PubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PubState {
    type Err = TribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added"   => Ok(PubState::Added),
            "removed" => Ok(PubState::Removed),
            "current" => Ok(PubState::Current),
            other     => Err(TribeError::InvalidPubState(other.to_string())),
        }
    }
}
