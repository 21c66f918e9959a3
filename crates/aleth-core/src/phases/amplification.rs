//! Phase 2: recursive amplification with per-tile storage nodes.
//!
//! Tiles are sampled fresh (phase 1 tiles are not reused). Each tile owns a
//! contiguous slice of a pre-allocated storage pool, and every node in the
//! slice banks the tile's full amplified output.

use aleth_types::{ArtifactKey, MeasurementRecord, unix_timestamp};
use rand::Rng;
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::config::{AmplificationConfig, MeasurementConfig};
use crate::phases::measurement::{CasimirTile, Rectifier};

/// Applies a fixed gain `recursion_depth` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecursiveAmplifier {
    /// Gain per recursion level.
    pub gain_factor: f64,
    /// Number of recursion levels.
    pub recursion_depth: u32,
}

impl RecursiveAmplifier {
    /// Amplifier with the configured gain and depth.
    pub const fn from_config(config: &AmplificationConfig) -> Self {
        Self {
            gain_factor: config.gain_factor,
            recursion_depth: config.recursion_depth,
        }
    }

    /// Overall multiplier, `gain_factor ^ recursion_depth`.
    pub fn multiplier(&self) -> f64 {
        (0..self.recursion_depth).fold(1.0, |acc, _| acc * self.gain_factor)
    }

    /// Amplify a rectified voltage.
    pub fn amplify(&self, rectified_uv: f64) -> f64 {
        rectified_uv * self.multiplier()
    }
}

/// A capacitor bank accumulating amplified energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageNode {
    energy_j: f64,
    energy_scale: f64,
}

impl StorageNode {
    /// Node seeded with its capacitor energy, `0.5 * C * V^2`.
    pub fn new(capacitance_farad: f64, voltage_v: f64, energy_scale: f64) -> Self {
        Self {
            energy_j: 0.5 * capacitance_farad * voltage_v * voltage_v,
            energy_scale,
        }
    }

    /// Current running total in joules.
    pub const fn energy_j(&self) -> f64 {
        self.energy_j
    }

    /// Bank an amplified voltage and return the new running total.
    pub fn store(&mut self, amplified_uv: f64) -> f64 {
        self.energy_j += amplified_uv * self.energy_scale;
        self.energy_j
    }
}

/// Storage nodes for every tile, laid out tile-major.
#[derive(Debug, Clone)]
pub struct StoragePool {
    nodes: Vec<StorageNode>,
    nodes_per_tile: usize,
}

impl StoragePool {
    /// Allocate `tile_count * nodes_per_tile` freshly seeded nodes.
    pub fn new(config: &AmplificationConfig) -> Self {
        let node = StorageNode::new(
            config.capacitance_farad,
            config.voltage_v,
            config.energy_scale,
        );
        let total = config.tile_count.saturating_mul(config.nodes_per_tile);
        Self {
            nodes: (0..total).map(|_| node).collect(),
            nodes_per_tile: usize::try_from(config.nodes_per_tile).unwrap_or(usize::MAX),
        }
    }

    /// Total number of nodes in the pool.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the pool holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes owned by a 1-based tile index. Empty when out of range.
    pub fn tile_nodes_mut(&mut self, tile_index: u32) -> &mut [StorageNode] {
        let per_tile = self.nodes_per_tile;
        let range = tile_index
            .checked_sub(1)
            .and_then(|tile| usize::try_from(tile).ok())
            .and_then(|tile| tile.checked_mul(per_tile))
            .and_then(|start| start.checked_add(per_tile).map(|end| start..end));
        match range {
            Some(range) => self.nodes.get_mut(range).unwrap_or_default(),
            None => &mut [],
        }
    }
}

/// Key of the phase 2 artifact for a 1-based tile index.
pub fn amplification_key(tile_index: u32) -> ArtifactKey {
    ArtifactKey::new(format!("ZPE-Array-Tile-{tile_index}"))
}

/// Measure, rectify, amplify, and store for `config.tile_count` tiles.
///
/// `tile_model` supplies the measurement and rectifier parameters; its
/// `tile_count` is ignored in favour of the amplification config.
///
/// # Errors
///
/// Returns the first [`ArtifactError`] raised by the writer.
pub fn run_amplification_phase(
    tile_model: &MeasurementConfig,
    config: &AmplificationConfig,
    writer: &mut impl ArtifactWriter,
    rng: &mut impl Rng,
) -> Result<Vec<ArtifactKey>, ArtifactError> {
    let tile = CasimirTile::from_config(tile_model);
    let rectifier = Rectifier::from_config(tile_model);
    let amplifier = RecursiveAmplifier::from_config(config);
    let mut pool = StoragePool::new(config);
    let mut artifacts = Vec::new();

    for tile_index in 1..=config.tile_count {
        let measured = tile.measure(tile_model, rng);
        let rectified = rectifier.rectify(measured);
        let amplified = amplifier.amplify(rectified);
        let stored_energies: Vec<f64> = pool
            .tile_nodes_mut(tile_index)
            .iter_mut()
            .map(|node| node.store(amplified))
            .collect();

        let key = amplification_key(tile_index);
        let record = MeasurementRecord {
            tile_index,
            plate_separation: tile.plate_separation_nm,
            measured_value: measured,
            rectified_value: rectified,
            amplified_value: Some(amplified),
            stored_energies: Some(stored_energies),
            timestamp: unix_timestamp(),
        };
        writer.emit(&key, &record)?;
        info!(
            phase = 2,
            artifact = %key,
            amplified_uv = amplified,
            stored_energies = ?record.stored_energies,
            "Amplified tile emitted"
        );
        artifacts.push(key);
    }

    Ok(artifacts)
}
