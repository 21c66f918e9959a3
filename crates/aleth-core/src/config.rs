//! Configuration loading and typed config structures for the Aleth sandbox.
//!
//! The optional configuration file is `aleth-config.yaml` in the working
//! directory. Every field has a default matching the reference pipeline, so
//! an empty file (or no file at all) yields the standard five-phase run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable overriding [`OutputConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "ALETH_DATA_DIR";

/// Environment variable overriding [`SandboxConfig::seed`].
pub const SEED_ENV: &str = "ALETH_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level sandbox configuration.
///
/// Mirrors the structure of `aleth-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SandboxConfig {
    /// Where artifacts are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Seed for the pipeline RNG. `None` draws entropy from the OS, which
    /// makes runs non-reproducible.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Phase 1 tile model (also used to sample phase 2 tiles).
    #[serde(default)]
    pub measurement: MeasurementConfig,

    /// Phase 2 amplifier and storage parameters.
    #[serde(default)]
    pub amplification: AmplificationConfig,

    /// Phase 3 node count.
    #[serde(default)]
    pub speculative: SpeculativeConfig,

    /// Phase 4 node names.
    #[serde(default)]
    pub grid: GridConfig,

    /// Phase 5 clause text.
    #[serde(default)]
    pub lineage: LineageConfig,
}

impl SandboxConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ALETH_DATA_DIR` overrides `output.data_dir`
    /// - `ALETH_SEED` overrides `seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override or value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            self.output.data_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = std::env::var(SEED_ENV) {
            let seed = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "seed",
                reason: format!("{SEED_ENV}={raw:?} is not an unsigned integer: {e}"),
            })?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    /// Check value ranges that would otherwise panic or produce
    /// meaningless samples.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.measurement;
        if !(m.fluctuation_min_uv.is_finite() && m.fluctuation_max_uv.is_finite())
            || m.fluctuation_min_uv > m.fluctuation_max_uv
        {
            return Err(ConfigError::Invalid {
                field: "measurement.fluctuation_min_uv",
                reason: format!(
                    "range [{}, {}] is empty or not finite",
                    m.fluctuation_min_uv, m.fluctuation_max_uv
                ),
            });
        }
        if !is_non_negative(m.noise_sigma_uv) {
            return Err(ConfigError::Invalid {
                field: "measurement.noise_sigma_uv",
                reason: format!("must be non-negative, got {}", m.noise_sigma_uv),
            });
        }
        if !is_non_negative(m.rectifier_efficiency) {
            return Err(ConfigError::Invalid {
                field: "measurement.rectifier_efficiency",
                reason: format!("must be non-negative, got {}", m.rectifier_efficiency),
            });
        }
        if !is_non_negative(self.amplification.gain_factor) {
            return Err(ConfigError::Invalid {
                field: "amplification.gain_factor",
                reason: format!(
                    "must be non-negative, got {}",
                    self.amplification.gain_factor
                ),
            });
        }
        let a = &self.amplification;
        if !(is_non_negative(a.energy_scale) && a.energy_scale.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "amplification.energy_scale",
                reason: format!("must be finite and non-negative, got {}", a.energy_scale),
            });
        }
        if !a.capacitance_farad.is_finite() {
            return Err(ConfigError::Invalid {
                field: "amplification.capacitance_farad",
                reason: format!("must be finite, got {}", a.capacitance_farad),
            });
        }
        if !a.voltage_v.is_finite() {
            return Err(ConfigError::Invalid {
                field: "amplification.voltage_v",
                reason: format!("must be finite, got {}", a.voltage_v),
            });
        }
        self.validate_grid_names()?;
        if self.lineage.clause.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "lineage.clause",
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Grid names become artifact keys and file names, so they must be
    /// unique, non-empty, and free of path components.
    fn validate_grid_names(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for name in &self.grid.node_names {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "grid.node_names",
                    reason: "node names must not be empty".to_owned(),
                });
            }
            if name.contains(['/', '\\']) || name.contains("..") {
                return Err(ConfigError::Invalid {
                    field: "grid.node_names",
                    reason: format!("node name {name:?} contains a path component"),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "grid.node_names",
                    reason: format!("duplicate node name {name:?}"),
                });
            }
        }
        Ok(())
    }
}

/// False for negative values and NaN.
fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}

/// Artifact output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<key>.json` files. Created if absent.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Casimir tile and rectifier model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementConfig {
    /// Number of phase 1 tiles.
    #[serde(default = "default_measurement_tiles")]
    pub tile_count: u32,

    /// Plate separation recorded on every tile, in nanometres.
    #[serde(default = "default_plate_separation_nm")]
    pub plate_separation_nm: f64,

    /// Lower bound of the uniform fluctuation draw, in microvolts.
    #[serde(default = "default_fluctuation_min_uv")]
    pub fluctuation_min_uv: f64,

    /// Upper bound of the uniform fluctuation draw, in microvolts.
    #[serde(default = "default_fluctuation_max_uv")]
    pub fluctuation_max_uv: f64,

    /// Standard deviation of the zero-mean Gaussian noise, in microvolts.
    #[serde(default = "default_noise_sigma_uv")]
    pub noise_sigma_uv: f64,

    /// Multiplicative rectification efficiency.
    #[serde(default = "default_rectifier_efficiency")]
    pub rectifier_efficiency: f64,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            tile_count: default_measurement_tiles(),
            plate_separation_nm: default_plate_separation_nm(),
            fluctuation_min_uv: default_fluctuation_min_uv(),
            fluctuation_max_uv: default_fluctuation_max_uv(),
            noise_sigma_uv: default_noise_sigma_uv(),
            rectifier_efficiency: default_rectifier_efficiency(),
        }
    }
}

/// Recursive amplifier and storage pool parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmplificationConfig {
    /// Number of phase 2 tiles.
    #[serde(default = "default_amplification_tiles")]
    pub tile_count: u32,

    /// Storage nodes assigned to each tile.
    #[serde(default = "default_nodes_per_tile")]
    pub nodes_per_tile: u32,

    /// Gain applied at each recursion level.
    #[serde(default = "default_gain_factor")]
    pub gain_factor: f64,

    /// Number of times the gain is applied.
    #[serde(default = "default_recursion_depth")]
    pub recursion_depth: u32,

    /// Storage node capacitance in farads.
    #[serde(default = "default_capacitance_farad")]
    pub capacitance_farad: f64,

    /// Storage node charge voltage in volts.
    #[serde(default = "default_voltage_v")]
    pub voltage_v: f64,

    /// Joules credited per amplified microvolt.
    #[serde(default = "default_energy_scale")]
    pub energy_scale: f64,
}

impl Default for AmplificationConfig {
    fn default() -> Self {
        Self {
            tile_count: default_amplification_tiles(),
            nodes_per_tile: default_nodes_per_tile(),
            gain_factor: default_gain_factor(),
            recursion_depth: default_recursion_depth(),
            capacitance_farad: default_capacitance_farad(),
            voltage_v: default_voltage_v(),
            energy_scale: default_energy_scale(),
        }
    }
}

/// Speculative escalation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpeculativeConfig {
    /// Number of nodes, named `SpecNode-1` through `SpecNode-{node_count}`.
    #[serde(default = "default_speculative_nodes")]
    pub node_count: u32,
}

impl Default for SpeculativeConfig {
    fn default() -> Self {
        Self {
            node_count: default_speculative_nodes(),
        }
    }
}

/// Grid deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Names of the nodes handed to the grid. Independent of phase 3.
    #[serde(default = "default_grid_nodes")]
    pub node_names: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_names: default_grid_nodes(),
        }
    }
}

/// Lineage annotation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineageConfig {
    /// Clause text stamped on every lineage record.
    #[serde(default = "default_clause")]
    pub clause: String,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            clause: default_clause(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_measurement_tiles() -> u32 {
    2
}

const fn default_plate_separation_nm() -> f64 {
    20.0
}

const fn default_fluctuation_min_uv() -> f64 {
    0.01
}

const fn default_fluctuation_max_uv() -> f64 {
    0.5
}

const fn default_noise_sigma_uv() -> f64 {
    0.02
}

const fn default_rectifier_efficiency() -> f64 {
    0.03
}

const fn default_amplification_tiles() -> u32 {
    3
}

const fn default_nodes_per_tile() -> u32 {
    2
}

const fn default_gain_factor() -> f64 {
    10.0
}

const fn default_recursion_depth() -> u32 {
    3
}

const fn default_capacitance_farad() -> f64 {
    50.0
}

const fn default_voltage_v() -> f64 {
    48.0
}

const fn default_energy_scale() -> f64 {
    1e-9
}

const fn default_speculative_nodes() -> u32 {
    2
}

fn default_grid_nodes() -> Vec<String> {
    vec!["SpecNode-1".to_owned(), "SpecNode-2".to_owned()]
}

fn default_clause() -> String {
    "Future ZPE scaling / sovereign deployment".to_owned()
}
