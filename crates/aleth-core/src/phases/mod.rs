//! The five pipeline phases.
//!
//! Each phase is a free function taking its config slice, an
//! [`ArtifactWriter`](crate::artifact::ArtifactWriter), and (where it
//! samples) the caller's RNG. Each returns the keys it emitted, in emission
//! order. Errors from the writer propagate unchanged.
//!
//! - [`measurement`] -- Phase 1, base tile measurement
//! - [`amplification`] -- Phase 2, recursive amplification and storage
//! - [`speculative`] -- Phase 3, speculative trigger evaluation
//! - [`grid`] -- Phase 4, grid deployment
//! - [`lineage`] -- Phase 5, future-clause lineage annotation

pub mod amplification;
pub mod grid;
pub mod lineage;
pub mod measurement;
pub mod speculative;

pub use amplification::run_amplification_phase;
pub use grid::run_grid_phase;
pub use lineage::run_lineage_phase;
pub use measurement::run_measurement_phase;
pub use speculative::{SpeculativeNode, run_speculative_phase};
