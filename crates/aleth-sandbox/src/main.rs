//! Aleth sandbox binary.
//!
//! Runs the five-phase zero-point energy demonstration once and exits.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `aleth-config.yaml`, or defaults
//! 3. Seed the RNG (configured seed, otherwise OS entropy)
//! 4. Create the artifact directory
//! 5. Run phases 1-5
//! 6. Log the per-phase summary

mod error;

use std::path::Path;

use aleth_core::artifact::DirectoryWriter;
use aleth_core::config::SandboxConfig;
use aleth_core::runner::{self, PipelineRunner};
use anyhow::Context as _;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::SandboxError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "aleth-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, directory creation, or any artifact
/// write fails. Artifacts written before the failure are kept.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("aleth-sandbox starting");
    run().context("aleth sandbox run aborted")
}

fn run() -> Result<(), SandboxError> {
    let config = load_config()?;
    info!(
        data_dir = %config.output.data_dir.display(),
        seed = ?config.seed,
        measurement_tiles = config.measurement.tile_count,
        amplification_tiles = config.amplification.tile_count,
        nodes_per_tile = config.amplification.nodes_per_tile,
        speculative_nodes = config.speculative.node_count,
        grid_nodes = config.grid.node_names.len(),
        "Configuration loaded"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut writer = DirectoryWriter::create(&config.output.data_dir)?;
    info!(dir = %writer.dir().display(), "Artifact directory ready");

    let pipeline = PipelineRunner::new(config);
    let summary = pipeline.run(&mut writer, &mut rng)?;
    runner::log_pipeline_end(&summary);

    info!(run_id = %summary.run_id, "aleth-sandbox shutdown complete");
    Ok(())
}

/// Load `aleth-config.yaml` if present, otherwise defaults. Environment
/// overrides apply either way.
fn load_config() -> Result<SandboxConfig, SandboxError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(SandboxConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SandboxConfig::from_env()?)
    }
}
