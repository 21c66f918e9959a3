//! Artifact writer trait and its directory and in-memory implementations.
//!
//! Every phase hands its records to an [`ArtifactWriter`]. The writer owns
//! the mapping from [`ArtifactKey`] to storage location; callers own key
//! uniqueness. Emitting the same key twice silently replaces the earlier
//! artifact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aleth_types::ArtifactKey;
use serde::Serialize;
use tracing::debug;

/// Errors that can occur while emitting an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The output directory could not be created.
    #[error("failed to create artifact directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the artifact file failed.
    #[error("failed to write artifact {key} to {}: {source}", .path.display())]
    Write {
        /// Key of the artifact being written.
        key: ArtifactKey,
        /// Destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The record could not be serialized to JSON.
    #[error("failed to serialize artifact {key}: {source}")]
    Serialize {
        /// Key of the artifact being serialized.
        key: ArtifactKey,
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

/// A destination for emitted artifacts.
///
/// Implementations must be deterministic in where a key lands: the same
/// key always addresses the same slot, and a later emit overwrites it.
pub trait ArtifactWriter {
    /// Serialize `record` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] if serialization or the underlying storage
    /// fails. Nothing is retried.
    fn emit<R: Serialize>(&mut self, key: &ArtifactKey, record: &R) -> Result<(), ArtifactError>;
}

// ---------------------------------------------------------------------------
// DirectoryWriter
// ---------------------------------------------------------------------------

/// Writes each artifact as pretty-printed JSON to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    dir: PathBuf,
}

impl DirectoryWriter {
    /// Create the output directory (and parents) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::CreateDir`] if the directory cannot be
    /// created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| ArtifactError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The directory artifacts are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact with `key` is written to.
    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ArtifactWriter for DirectoryWriter {
    fn emit<R: Serialize>(&mut self, key: &ArtifactKey, record: &R) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(record).map_err(|source| {
            ArtifactError::Serialize {
                key: key.clone(),
                source,
            }
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, json).map_err(|source| ArtifactError::Write {
            key: key.clone(),
            path: path.clone(),
            source,
        })?;
        debug!(artifact = %key, path = %path.display(), "Artifact written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryWriter
// ---------------------------------------------------------------------------

/// Keeps emitted artifacts in memory as JSON values.
///
/// Used to exercise the phases without touching the filesystem. Tracks
/// both the latest value per key and the order of every emit call.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    artifacts: BTreeMap<ArtifactKey, serde_json::Value>,
    emitted: Vec<ArtifactKey>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value stored under `key`.
    pub fn get(&self, key: &ArtifactKey) -> Option<&serde_json::Value> {
        self.artifacts.get(key)
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Every key passed to `emit`, in call order, including repeats.
    pub fn emitted(&self) -> &[ArtifactKey] {
        &self.emitted
    }
}

impl ArtifactWriter for MemoryWriter {
    fn emit<R: Serialize>(&mut self, key: &ArtifactKey, record: &R) -> Result<(), ArtifactError> {
        let value = serde_json::to_value(record).map_err(|source| ArtifactError::Serialize {
            key: key.clone(),
            source,
        })?;
        self.artifacts.insert(key.clone(), value);
        self.emitted.push(key.clone());
        Ok(())
    }
}
