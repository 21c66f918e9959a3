//! Record types emitted as JSON artifacts by the pipeline phases.
//!
//! Field names are the on-disk JSON schema. Units follow the sandbox
//! conventions: plate separation in nanometres, voltages in microvolts,
//! stored energy in joules, timestamps in fractional Unix seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current wall-clock time as fractional Unix seconds.
pub fn unix_timestamp() -> f64 {
    seconds_since_epoch(Utc::now())
}

/// Convert a UTC instant into fractional Unix seconds.
#[allow(clippy::cast_precision_loss)]
pub fn seconds_since_epoch(at: DateTime<Utc>) -> f64 {
    let whole = at.timestamp() as f64;
    let micros = f64::from(at.timestamp_subsec_micros());
    whole + micros / 1_000_000.0
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// One simulated tile measurement.
///
/// Phase 1 records carry only the measured and rectified values. Phase 2
/// records additionally carry the amplified value and the running totals
/// of the storage nodes that received it; absent fields are omitted from
/// the JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// 1-based tile index within its phase.
    pub tile_index: u32,
    /// Casimir plate separation in nanometres.
    pub plate_separation: f64,
    /// Clamped fluctuation voltage in microvolts. Never negative.
    pub measured_value: f64,
    /// `measured_value` scaled by the rectifier efficiency.
    pub rectified_value: f64,
    /// `rectified_value` after recursive amplification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplified_value: Option<f64>,
    /// Running energy totals (joules) of this tile's storage nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_energies: Option<Vec<f64>>,
    /// Creation time in Unix seconds.
    pub timestamp: f64,
}

// ---------------------------------------------------------------------------
// Speculative triggers
// ---------------------------------------------------------------------------

/// The four named speculative trigger conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerSet {
    /// Non-thermal vacuum condition.
    pub non_thermal_vacuum: bool,
    /// Stochastic rectification condition.
    pub stochastic_rectification: bool,
    /// Macro-scale quantum coherence condition.
    pub macro_quantum_coherence: bool,
    /// Topological amplification condition.
    pub topological_amplification: bool,
}

impl TriggerSet {
    /// Whether every trigger fired.
    pub const fn all_fired(&self) -> bool {
        self.non_thermal_vacuum
            && self.stochastic_rectification
            && self.macro_quantum_coherence
            && self.topological_amplification
    }
}

/// Outcome of evaluating one speculative node.
///
/// `engaged` is derived from the triggers at construction, so a record can
/// never claim engagement its triggers do not support. Deserialization
/// recomputes it the same way and ignores the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSpeculativeRecord")]
pub struct SpeculativeRecord {
    node_name: String,
    engaged: bool,
    triggers: TriggerSet,
    timestamp: f64,
}

impl SpeculativeRecord {
    /// Build a record, deriving engagement from `triggers`.
    pub fn new(node_name: impl Into<String>, triggers: TriggerSet, timestamp: f64) -> Self {
        Self {
            node_name: node_name.into(),
            engaged: triggers.all_fired(),
            triggers,
            timestamp,
        }
    }

    /// Name of the evaluated node.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// True iff all four triggers fired.
    pub const fn engaged(&self) -> bool {
        self.engaged
    }

    /// The sampled trigger values.
    pub const fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    /// Creation time in Unix seconds.
    pub const fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// On-disk shape of a [`SpeculativeRecord`].
#[derive(Deserialize)]
struct StoredSpeculativeRecord {
    node_name: String,
    triggers: TriggerSet,
    timestamp: f64,
}

impl From<StoredSpeculativeRecord> for SpeculativeRecord {
    fn from(stored: StoredSpeculativeRecord) -> Self {
        Self::new(stored.node_name, stored.triggers, stored.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

/// Grid deployment outcome for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Name of the deployed node.
    pub node_name: String,
    /// Whether the deployment succeeded.
    pub deployed: bool,
    /// Creation time in Unix seconds.
    pub timestamp: f64,
}

// ---------------------------------------------------------------------------
// Lineage
// ---------------------------------------------------------------------------

/// Forward-looking annotation attached to an earlier artifact.
///
/// The link is by key only; the referenced artifact is never loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    /// Key of the annotated artifact, verbatim.
    pub artifact_id: String,
    /// Fixed clause text.
    pub clause: String,
    /// Creation time in Unix seconds.
    pub timestamp: f64,
}
