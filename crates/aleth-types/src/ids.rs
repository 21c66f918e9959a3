//! Type-safe artifact identifiers.
//!
//! Artifact keys are plain strings on disk (`<key>.json`), but wrapping them
//! keeps them from being confused with node names or file paths.

use serde::{Deserialize, Serialize};

/// Suffix appended to a source key to form its lineage annotation key.
pub const FUTURE_SUFFIX: &str = "-future";

/// Unique key identifying one emitted artifact within a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Wrap a raw key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the lineage annotation that references this artifact.
    pub fn future(&self) -> Self {
        Self(format!("{}{FUTURE_SUFFIX}", self.0))
    }
}

impl core::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArtifactKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ArtifactKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl AsRef<str> for ArtifactKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
