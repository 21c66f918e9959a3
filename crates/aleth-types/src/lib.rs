//! Shared type definitions for the Aleth sandbox pipeline.
//!
//! Every artifact the pipeline emits is one of the record types defined
//! here, stored under an [`ArtifactKey`]. Records are immutable value
//! objects: built once, serialized once, never read back.
//!
//! # Modules
//!
//! - [`ids`] -- The [`ArtifactKey`] newtype
//! - [`records`] -- Measurement, speculative, deployment, and lineage records

pub mod ids;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use ids::ArtifactKey;
pub use records::{
    DeploymentRecord, LineageRecord, MeasurementRecord, SpeculativeRecord, TriggerSet,
    unix_timestamp,
};
