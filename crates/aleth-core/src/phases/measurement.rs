//! Phase 1: base fluctuation measurement on simulated Casimir tiles.

use aleth_types::{ArtifactKey, MeasurementRecord, unix_timestamp};
use rand::Rng;
use tracing::info;

use crate::artifact::{ArtifactError, ArtifactWriter};
use crate::config::MeasurementConfig;
use crate::sampling;

/// A simulated Casimir tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CasimirTile {
    /// Plate separation in nanometres.
    pub plate_separation_nm: f64,
}

impl CasimirTile {
    /// Tile with the configured plate separation.
    pub const fn from_config(config: &MeasurementConfig) -> Self {
        Self {
            plate_separation_nm: config.plate_separation_nm,
        }
    }

    /// Sample a fluctuation voltage in microvolts.
    ///
    /// Uniform base plus zero-mean Gaussian noise, clamped at zero.
    pub fn measure(&self, config: &MeasurementConfig, rng: &mut impl Rng) -> f64 {
        let base = sampling::uniform(rng, config.fluctuation_min_uv, config.fluctuation_max_uv);
        let noise = sampling::normal(rng, 0.0, config.noise_sigma_uv);
        (base + noise).max(0.0)
    }
}

/// Fixed-efficiency fluctuation rectifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectifier {
    /// Fraction of the measured voltage that survives rectification.
    pub efficiency: f64,
}

impl Rectifier {
    /// Rectifier with the configured efficiency.
    pub const fn from_config(config: &MeasurementConfig) -> Self {
        Self {
            efficiency: config.rectifier_efficiency,
        }
    }

    /// Scale a measured voltage by the efficiency.
    pub fn rectify(&self, measured_uv: f64) -> f64 {
        measured_uv * self.efficiency
    }
}

/// Key of the phase 1 artifact for a 1-based tile index.
pub fn measurement_key(tile_index: u32) -> ArtifactKey {
    ArtifactKey::new(format!("ZPE-Demo-tile-{tile_index}"))
}

/// Measure and rectify `config.tile_count` tiles, emitting one record each.
///
/// # Errors
///
/// Returns the first [`ArtifactError`] raised by the writer.
pub fn run_measurement_phase(
    config: &MeasurementConfig,
    writer: &mut impl ArtifactWriter,
    rng: &mut impl Rng,
) -> Result<Vec<ArtifactKey>, ArtifactError> {
    let tile = CasimirTile::from_config(config);
    let rectifier = Rectifier::from_config(config);
    let mut artifacts = Vec::new();

    for tile_index in 1..=config.tile_count {
        let measured = tile.measure(config, rng);
        let rectified = rectifier.rectify(measured);
        let key = measurement_key(tile_index);
        let record = MeasurementRecord {
            tile_index,
            plate_separation: tile.plate_separation_nm,
            measured_value: measured,
            rectified_value: rectified,
            amplified_value: None,
            stored_energies: None,
            timestamp: unix_timestamp(),
        };
        writer.emit(&key, &record)?;
        info!(
            phase = 1,
            artifact = %key,
            rectified_uv = rectified,
            "Measurement emitted"
        );
        artifacts.push(key);
    }

    Ok(artifacts)
}
