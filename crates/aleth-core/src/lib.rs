//! Phase simulators, artifact writers, and the pipeline runner for the
//! Aleth sandbox.
//!
//! The sandbox runs a fixed five-phase "zero-point energy" demonstration:
//! base measurement, amplification and storage, speculative triggers, grid
//! deployment, and lineage annotation. Each phase writes its results as
//! JSON artifacts through an [`ArtifactWriter`].
//!
//! # Modules
//!
//! - [`artifact`] -- [`ArtifactWriter`] trait, [`DirectoryWriter`], and
//!   [`MemoryWriter`].
//! - [`config`] -- Configuration loading from `aleth-config.yaml` into
//!   strongly-typed structs.
//! - [`phases`] -- The five phase simulators.
//! - [`runner`] -- [`PipelineRunner`] and end-of-run summary logging.
//! - [`sampling`] -- Random draws shared by the phases.
//!
//! [`ArtifactWriter`]: artifact::ArtifactWriter
//! [`DirectoryWriter`]: artifact::DirectoryWriter
//! [`MemoryWriter`]: artifact::MemoryWriter
//! [`PipelineRunner`]: runner::PipelineRunner

pub mod artifact;
pub mod config;
pub mod phases;
pub mod runner;
pub mod sampling;
