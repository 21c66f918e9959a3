//! Five-phase pipeline runner.
//!
//! [`PipelineRunner::run`] executes the phases strictly in order:
//!
//! 1. Base measurement
//! 2. Amplification and storage
//! 3. Speculative trigger evaluation
//! 4. Grid deployment of freshly named nodes (phase 3's nodes and
//!    engagement results are not consulted)
//! 5. Lineage annotation of every phase 3 and phase 4 artifact
//!
//! There is no rollback. The first writer failure aborts the run and
//! artifacts already emitted stay where they are.

use aleth_types::ArtifactKey;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::config::{ConfigError, SandboxConfig};
use crate::phases::{
    SpeculativeNode, run_amplification_phase, run_grid_phase, run_lineage_phase,
    run_measurement_phase, run_speculative_phase,
};

/// Pipeline stage, used to label errors and summary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Phase 1.
    Measurement,
    /// Phase 2.
    Amplification,
    /// Phase 3.
    Speculative,
    /// Phase 4.
    Grid,
    /// Phase 5.
    Lineage,
}

impl Phase {
    /// 1-based position in the pipeline.
    pub const fn number(self) -> u8 {
        match self {
            Self::Measurement => 1,
            Self::Amplification => 2,
            Self::Speculative => 3,
            Self::Grid => 4,
            Self::Lineage => 5,
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Measurement => "measurement",
            Self::Amplification => "amplification",
            Self::Speculative => "speculative",
            Self::Grid => "grid",
            Self::Lineage => "lineage",
        };
        write!(f, "phase {} ({name})", self.number())
    }
}

/// Errors that can occur during a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration would produce colliding keys or invalid samples.
    #[error("refusing to run with invalid config: {source}")]
    Config {
        /// The validation failure.
        #[from]
        source: ConfigError,
    },

    /// A phase failed to emit an artifact.
    #[error("{phase} failed: {source}")]
    Artifact {
        /// The phase that was running.
        phase: Phase,
        /// The underlying writer error.
        source: ArtifactError,
    },
}

/// Keys emitted by each phase of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Identifier of this run (UUID v7), for log correlation.
    pub run_id: Uuid,
    /// Phase 1 keys, in tile order.
    pub measurement: Vec<ArtifactKey>,
    /// Phase 2 keys, in tile order.
    pub amplification: Vec<ArtifactKey>,
    /// Phase 3 keys, in node order.
    pub speculative: Vec<ArtifactKey>,
    /// Phase 4 keys, in input order.
    pub grid: Vec<ArtifactKey>,
    /// Phase 5 keys: phase 3 annotations, then phase 4 annotations.
    pub lineage: Vec<ArtifactKey>,
}

impl PipelineSummary {
    /// Keys for a single phase.
    pub fn keys(&self, phase: Phase) -> &[ArtifactKey] {
        match phase {
            Phase::Measurement => &self.measurement,
            Phase::Amplification => &self.amplification,
            Phase::Speculative => &self.speculative,
            Phase::Grid => &self.grid,
            Phase::Lineage => &self.lineage,
        }
    }

    /// Number of artifacts emitted across all phases.
    pub fn total_artifacts(&self) -> usize {
        [
            Phase::Measurement,
            Phase::Amplification,
            Phase::Speculative,
            Phase::Grid,
            Phase::Lineage,
        ]
        .into_iter()
        .map(|phase| self.keys(phase).len())
        .sum()
    }
}

/// Runs the five phases against a writer and RNG.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    config: SandboxConfig,
    run_id: Uuid,
}

impl PipelineRunner {
    /// Create a runner with a fresh run id.
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            run_id: Uuid::now_v7(),
        }
    }

    /// This runner's run id.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The configuration the runner was built with.
    pub const fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Nodes handed to the grid in phase 4.
    pub fn grid_nodes(&self) -> Vec<SpeculativeNode> {
        self.config
            .grid
            .node_names
            .iter()
            .map(SpeculativeNode::new)
            .collect()
    }

    /// Execute phases 1 through 5.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] before any phase runs if the
    /// configuration fails validation, or [`PipelineError::Artifact`]
    /// tagged with the failing phase. Earlier artifacts are left in place.
    pub fn run<W, R>(&self, writer: &mut W, rng: &mut R) -> Result<PipelineSummary, PipelineError>
    where
        W: ArtifactWriter,
        R: Rng,
    {
        let config = &self.config;
        config.validate()?;
        info!(run_id = %self.run_id, "=== Aleth Sandbox: Phases 1-5 Unified ZPE Pipeline ===");

        let measurement = run_measurement_phase(&config.measurement, writer, rng)
            .map_err(|source| tag(Phase::Measurement, source))?;

        let amplification =
            run_amplification_phase(&config.measurement, &config.amplification, writer, rng)
                .map_err(|source| tag(Phase::Amplification, source))?;

        let speculative = run_speculative_phase(&config.speculative, writer, rng)
            .map_err(|source| tag(Phase::Speculative, source))?;

        let grid = run_grid_phase(&self.grid_nodes(), writer, rng)
            .map_err(|source| tag(Phase::Grid, source))?;

        let lineage_sources: Vec<ArtifactKey> =
            speculative.iter().chain(&grid).cloned().collect();
        let lineage = run_lineage_phase(&lineage_sources, &config.lineage, writer)
            .map_err(|source| tag(Phase::Lineage, source))?;

        Ok(PipelineSummary {
            run_id: self.run_id,
            measurement,
            amplification,
            speculative,
            grid,
            lineage,
        })
    }
}

const fn tag(phase: Phase, source: ArtifactError) -> PipelineError {
    PipelineError::Artifact { phase, source }
}

/// Log the end-of-run summary, grouped by phase.
pub fn log_pipeline_end(summary: &PipelineSummary) {
    info!(
        run_id = %summary.run_id,
        total_artifacts = summary.total_artifacts(),
        "=== Aleth Sandbox Completed ==="
    );
    for phase in [
        Phase::Measurement,
        Phase::Amplification,
        Phase::Speculative,
        Phase::Grid,
        Phase::Lineage,
    ] {
        let keys: Vec<&str> = summary.keys(phase).iter().map(ArtifactKey::as_str).collect();
        info!(phase = %phase, count = keys.len(), artifacts = ?keys, "Phase artifacts");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::path::PathBuf;

    use aleth_types::DeploymentRecord;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde::Serialize;

    use super::*;
    use crate::artifact::MemoryWriter;

    /// Fails every emit after the first `allowed` calls.
    struct FailingWriter {
        inner: MemoryWriter,
        allowed: usize,
    }

    impl ArtifactWriter for FailingWriter {
        fn emit<R: Serialize>(
            &mut self,
            key: &ArtifactKey,
            record: &R,
        ) -> Result<(), ArtifactError> {
            if self.inner.emitted().len() >= self.allowed {
                return Err(ArtifactError::Write {
                    key: key.clone(),
                    path: PathBuf::from(format!("/readonly/{key}.json")),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                });
            }
            self.inner.emit(key, record)
        }
    }

    #[test]
    fn default_run_emits_thirteen_artifacts() {
        let runner = PipelineRunner::new(SandboxConfig::default());
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(42);

        let summary = runner.run(&mut writer, &mut rng).unwrap();

        assert_eq!(summary.measurement.len(), 2);
        assert_eq!(summary.amplification.len(), 3);
        assert_eq!(summary.speculative.len(), 2);
        assert_eq!(summary.grid.len(), 2);
        assert_eq!(summary.lineage.len(), 4);
        assert_eq!(summary.total_artifacts(), 13);
        assert_eq!(writer.len(), 13);
        assert_eq!(writer.emitted().len(), 13);
        assert_eq!(summary.run_id, runner.run_id());
    }

    #[test]
    fn phases_run_in_order() {
        let runner = PipelineRunner::new(SandboxConfig::default());
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(1);

        let summary = runner.run(&mut writer, &mut rng).unwrap();

        let expected: Vec<ArtifactKey> = summary
            .measurement
            .iter()
            .chain(&summary.amplification)
            .chain(&summary.speculative)
            .chain(&summary.grid)
            .chain(&summary.lineage)
            .cloned()
            .collect();
        assert_eq!(writer.emitted(), expected.as_slice());
    }

    #[test]
    fn lineage_covers_speculative_then_grid() {
        let runner = PipelineRunner::new(SandboxConfig::default());
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(5);

        let summary = runner.run(&mut writer, &mut rng).unwrap();

        let names: Vec<&str> = summary.lineage.iter().map(ArtifactKey::as_str).collect();
        assert_eq!(
            names,
            vec![
                "ZPE-Speculative-SpecNode-1-future",
                "ZPE-Speculative-SpecNode-2-future",
                "ZPE-Grid-SpecNode-1-future",
                "ZPE-Grid-SpecNode-2-future",
            ]
        );
        let record = writer.get(&summary.lineage[2]).unwrap();
        assert_eq!(record["artifact_id"], "ZPE-Grid-SpecNode-1");
    }

    #[test]
    fn grid_uses_configured_names_not_phase_three_nodes() {
        let mut config = SandboxConfig::default();
        config.speculative.node_count = 3;
        config.grid.node_names = vec!["Sovereign-A".to_owned()];
        let runner = PipelineRunner::new(config);
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(9);

        let summary = runner.run(&mut writer, &mut rng).unwrap();

        assert_eq!(summary.speculative.len(), 3);
        assert_eq!(summary.grid, vec![ArtifactKey::new("ZPE-Grid-Sovereign-A")]);
        assert_eq!(summary.lineage.len(), 4);
        let record: DeploymentRecord =
            serde_json::from_value(writer.get(&summary.grid[0]).unwrap().clone()).unwrap();
        assert_eq!(record.node_name, "Sovereign-A");
    }

    #[test]
    fn same_seed_same_outcomes() {
        let runner = PipelineRunner::new(SandboxConfig::default());
        let mut a = MemoryWriter::new();
        let mut b = MemoryWriter::new();

        let summary = runner.run(&mut a, &mut SmallRng::seed_from_u64(77)).unwrap();
        runner.run(&mut b, &mut SmallRng::seed_from_u64(77)).unwrap();

        for key in summary.speculative.iter().chain(&summary.grid) {
            let (x, y) = (a.get(key).unwrap(), b.get(key).unwrap());
            assert_eq!(x["engaged"], y["engaged"]);
            assert_eq!(x["deployed"], y["deployed"]);
            assert_eq!(x["triggers"], y["triggers"]);
        }
    }

    #[test]
    fn failure_aborts_and_keeps_earlier_artifacts() {
        let runner = PipelineRunner::new(SandboxConfig::default());
        // Phase 1 (2) and phase 2 (3) succeed, phase 3 fails on its first emit.
        let mut writer = FailingWriter {
            inner: MemoryWriter::new(),
            allowed: 5,
        };
        let mut rng = SmallRng::seed_from_u64(3);

        let err = runner.run(&mut writer, &mut rng).unwrap_err();

        let PipelineError::Artifact { phase, source } = err else {
            panic!("expected an artifact error");
        };
        assert_eq!(phase, Phase::Speculative);
        assert!(matches!(source, ArtifactError::Write { .. }));
        assert_eq!(writer.inner.len(), 5);
    }

    #[test]
    fn duplicate_grid_names_rejected_before_any_emit() {
        let mut config = SandboxConfig::default();
        config.grid.node_names = vec!["A".to_owned(), "A".to_owned()];
        let runner = PipelineRunner::new(config);
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(6);

        let err = runner.run(&mut writer, &mut rng).unwrap_err();

        assert!(matches!(err, PipelineError::Config { .. }));
        assert!(writer.is_empty());
    }

    #[test]
    fn every_summary_key_is_stored_separately() {
        let mut config = SandboxConfig::default();
        config.grid.node_names = vec!["A".to_owned(), "B".to_owned(), "C".to_owned()];
        let runner = PipelineRunner::new(config);
        let mut writer = MemoryWriter::new();
        let mut rng = SmallRng::seed_from_u64(6);

        let summary = runner.run(&mut writer, &mut rng).unwrap();

        assert_eq!(summary.total_artifacts(), 2 + 3 + 2 + 3 + 5);
        assert_eq!(writer.len(), summary.total_artifacts());
    }

    #[test]
    fn phase_display_names_position() {
        assert_eq!(Phase::Grid.to_string(), "phase 4 (grid)");
        assert_eq!(Phase::Measurement.number(), 1);
    }
}
