//! End-to-end tests running the full pipeline into a scratch directory.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::panic
)]

use std::collections::BTreeSet;
use std::path::Path;

use aleth_core::artifact::{ArtifactError, DirectoryWriter};
use aleth_core::config::SandboxConfig;
use aleth_core::runner::{Phase, PipelineError, PipelineRunner};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn json_files(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json"))
        .collect()
}

fn read_json(dir: &Path, key: &str) -> serde_json::Value {
    let contents = std::fs::read_to_string(dir.join(format!("{key}.json")))
        .unwrap_or_else(|e| panic!("missing artifact {key}: {e}"));
    serde_json::from_str(&contents).expect("artifact is valid JSON")
}

#[test]
fn default_pipeline_writes_thirteen_files() {
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    let mut writer = DirectoryWriter::create(&data_dir).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    let summary = PipelineRunner::new(SandboxConfig::default())
        .run(&mut writer, &mut rng)
        .unwrap();

    let expected: BTreeSet<String> = [
        "ZPE-Demo-tile-1",
        "ZPE-Demo-tile-2",
        "ZPE-Array-Tile-1",
        "ZPE-Array-Tile-2",
        "ZPE-Array-Tile-3",
        "ZPE-Speculative-SpecNode-1",
        "ZPE-Speculative-SpecNode-2",
        "ZPE-Grid-SpecNode-1",
        "ZPE-Grid-SpecNode-2",
        "ZPE-Speculative-SpecNode-1-future",
        "ZPE-Speculative-SpecNode-2-future",
        "ZPE-Grid-SpecNode-1-future",
        "ZPE-Grid-SpecNode-2-future",
    ]
    .iter()
    .map(|key| format!("{key}.json"))
    .collect();

    assert_eq!(summary.total_artifacts(), 13);
    assert_eq!(json_files(&data_dir), expected);
}

#[test]
fn artifacts_follow_record_schemas() {
    let tmp = tempfile::tempdir().unwrap();
    let mut writer = DirectoryWriter::create(tmp.path()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    PipelineRunner::new(SandboxConfig::default())
        .run(&mut writer, &mut rng)
        .unwrap();

    let demo = read_json(tmp.path(), "ZPE-Demo-tile-1");
    assert_eq!(demo["tile_index"], 1);
    assert!(demo["measured_value"].as_f64().unwrap() >= 0.0);
    assert!(demo.get("amplified_value").is_none());

    let array = read_json(tmp.path(), "ZPE-Array-Tile-3");
    assert_eq!(array["tile_index"], 3);
    let energies = array["stored_energies"].as_array().unwrap();
    assert_eq!(energies.len(), 2);
    for energy in energies {
        assert!(energy.as_f64().unwrap() >= 57_600.0);
    }
    let rectified = array["rectified_value"].as_f64().unwrap();
    let amplified = array["amplified_value"].as_f64().unwrap();
    assert!((amplified - rectified * 1000.0).abs() <= 1e-12);

    let speculative = read_json(tmp.path(), "ZPE-Speculative-SpecNode-2");
    let all = speculative["triggers"]
        .as_object()
        .unwrap()
        .values()
        .all(|v| v.as_bool() == Some(true));
    assert_eq!(speculative["engaged"].as_bool(), Some(all));

    let grid = read_json(tmp.path(), "ZPE-Grid-SpecNode-1");
    assert_eq!(grid["node_name"], "SpecNode-1");
    assert!(grid["deployed"].is_boolean());

    let future = read_json(tmp.path(), "ZPE-Grid-SpecNode-1-future");
    assert_eq!(future["artifact_id"], "ZPE-Grid-SpecNode-1");
    assert_eq!(future["clause"], "Future ZPE scaling / sovereign deployment");
    assert!(future["timestamp"].as_f64().unwrap() > 0.0);
}

#[test]
fn rerun_overwrites_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let mut writer = DirectoryWriter::create(tmp.path()).unwrap();
    let runner = PipelineRunner::new(SandboxConfig::default());

    runner.run(&mut writer, &mut StdRng::seed_from_u64(1)).unwrap();
    runner.run(&mut writer, &mut StdRng::seed_from_u64(2)).unwrap();

    assert_eq!(json_files(tmp.path()).len(), 13);
}

#[test]
fn blocked_destination_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let mut writer = DirectoryWriter::create(tmp.path()).unwrap();
    // A directory where the first grid artifact should go.
    std::fs::create_dir(tmp.path().join("ZPE-Grid-SpecNode-1.json")).unwrap();

    let err = PipelineRunner::new(SandboxConfig::default())
        .run(&mut writer, &mut StdRng::seed_from_u64(4))
        .unwrap_err();

    let PipelineError::Artifact { phase, source } = err else {
        panic!("expected an artifact error");
    };
    assert_eq!(phase, Phase::Grid);
    assert!(matches!(source, ArtifactError::Write { .. }));
    // Phases 1-3 completed before the failure, plus the blocking entry.
    assert_eq!(json_files(tmp.path()).len(), 2 + 3 + 2 + 1);
    assert!(!tmp.path().join("ZPE-Speculative-SpecNode-1-future.json").exists());
}
