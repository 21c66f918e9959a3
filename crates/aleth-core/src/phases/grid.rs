//! Phase 4: grid deployment of caller-chosen nodes.

use aleth_types::{ArtifactKey, DeploymentRecord, unix_timestamp};
use rand::Rng;
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::phases::speculative::SpeculativeNode;
use crate::sampling;

/// Deploys a fixed set of nodes onto the grid.
#[derive(Debug, Clone)]
pub struct GridInterface<'a> {
    nodes: &'a [SpeculativeNode],
}

impl<'a> GridInterface<'a> {
    /// Grid over the given nodes.
    pub const fn new(nodes: &'a [SpeculativeNode]) -> Self {
        Self { nodes }
    }

    /// One deployment outcome per node, in node order.
    pub fn deploy(&self, rng: &mut impl Rng) -> Vec<bool> {
        self.nodes
            .iter()
            .map(|_| sampling::deployment_outcome(rng))
            .collect()
    }
}

/// Key of the phase 4 artifact for a node.
pub fn grid_key(node_name: &str) -> ArtifactKey {
    ArtifactKey::new(format!("ZPE-Grid-{node_name}"))
}

/// Deploy `nodes` and emit one record per node in input order.
///
/// # Errors
///
/// Returns the first [`ArtifactError`] raised by the writer.
pub fn run_grid_phase(
    nodes: &[SpeculativeNode],
    writer: &mut impl ArtifactWriter,
    rng: &mut impl Rng,
) -> Result<Vec<ArtifactKey>, ArtifactError> {
    let outcomes = GridInterface::new(nodes).deploy(rng);
    let mut artifacts = Vec::with_capacity(nodes.len());

    for (node, deployed) in nodes.iter().zip(outcomes) {
        let key = grid_key(&node.name);
        let record = DeploymentRecord {
            node_name: node.name.clone(),
            deployed,
            timestamp: unix_timestamp(),
        };
        writer.emit(&key, &record)?;
        info!(phase = 4, artifact = %key, deployed, "Grid node deployed");
        artifacts.push(key);
    }

    Ok(artifacts)
}
