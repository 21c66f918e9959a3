//! Phase 3: speculative trigger evaluation.

use aleth_types::{ArtifactKey, SpeculativeRecord, TriggerSet, unix_timestamp};
use rand::Rng;
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::config::SpeculativeConfig;
use crate::sampling;

/// A named node that may engage when all of its triggers fire.
///
/// Also the unit handed to the grid in phase 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeculativeNode {
    /// Node name, e.g. `SpecNode-1`.
    pub name: String,
}

impl SpeculativeNode {
    /// Create a node with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Nodes `SpecNode-1` through `SpecNode-{count}`.
    pub fn numbered(count: u32) -> Vec<Self> {
        (1..=count)
            .map(|i| Self::new(format!("SpecNode-{i}")))
            .collect()
    }

    /// Flip the four trigger coins.
    pub fn sample_triggers(&self, rng: &mut impl Rng) -> TriggerSet {
        TriggerSet {
            non_thermal_vacuum: sampling::coin_flip(rng),
            stochastic_rectification: sampling::coin_flip(rng),
            macro_quantum_coherence: sampling::coin_flip(rng),
            topological_amplification: sampling::coin_flip(rng),
        }
    }
}

/// Key of the phase 3 artifact for a node.
pub fn speculative_key(node_name: &str) -> ArtifactKey {
    ArtifactKey::new(format!("ZPE-Speculative-{node_name}"))
}

/// Evaluate `config.node_count` numbered nodes, emitting one record each.
///
/// # Errors
///
/// Returns the first [`ArtifactError`] raised by the writer.
pub fn run_speculative_phase(
    config: &SpeculativeConfig,
    writer: &mut impl ArtifactWriter,
    rng: &mut impl Rng,
) -> Result<Vec<ArtifactKey>, ArtifactError> {
    let mut artifacts = Vec::new();

    for node in SpeculativeNode::numbered(config.node_count) {
        let triggers = node.sample_triggers(rng);
        let record = SpeculativeRecord::new(node.name.as_str(), triggers, unix_timestamp());
        let key = speculative_key(&node.name);
        writer.emit(&key, &record)?;
        info!(
            phase = 3,
            artifact = %key,
            engaged = record.engaged(),
            triggers = ?triggers,
            "Speculative node evaluated"
        );
        artifacts.push(key);
    }

    Ok(artifacts)
}
