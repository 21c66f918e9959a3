//! Error types for the sandbox binary.
//!
//! [`SandboxError`] wraps every failure mode of a run so `main` can
//! propagate with `?`.

use aleth_core::artifact::ArtifactError;
use aleth_core::config::ConfigError;
use aleth_core::runner::PipelineError;

/// Top-level error for the sandbox binary.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The output directory could not be prepared.
    #[error("output error: {source}")]
    Output {
        /// The underlying writer error.
        #[from]
        source: ArtifactError,
    },

    /// A pipeline phase failed.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: PipelineError,
    },
}
