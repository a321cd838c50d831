//! CLI integration tests for `nngraph` using `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SQUARE_WITH_OUTLIER: &str = "0 0\n0 1\n1 0\n1 1\n100 100\n";

#[allow(deprecated)]
fn nngraph_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nngraph").unwrap();
    cmd.current_dir(dir).env_remove("NNGRAPH_DIRECTED");
    cmd
}

fn dataset(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("square.dat");
    fs::write(&path, text).unwrap();
    path
}

// =============================================================================
// Help & Argument Parsing
// =============================================================================

#[test]
fn test_help_displays_usage() {
    let dir = TempDir::new().unwrap();

    nngraph_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--local-scaling"));
}

#[test]
fn test_conflicting_topologies_rejected() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--directed", "2", "--mutual", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_prune_and_complete_rejected() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--directed", "2", "--delete", "--complete"])
        .assert()
        .failure();
}

#[test]
fn test_missing_topology_is_config_error() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing option"));
}

#[test]
fn test_local_scaling_in_radius_mode_rejected() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--radius", "2", "--local-scaling", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("radius mode"));
}

// =============================================================================
// Runs
// =============================================================================

#[test]
fn test_directed_run_writes_graph_and_index() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--directed", "1", "--sigma", "1.0", "--edgelist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph is connected"));

    let graph = fs::read_to_string(dir.path().join("square-graph.edges")).unwrap();
    assert!(graph.starts_with("# vertices 5\n# directed true\n"));
    assert!(graph.lines().any(|line| line.starts_with("4 3 ")));
    assert!(dir.path().join("square-index.knn").exists());
    assert!(!dir.path().join("square-pruned.dat").exists());
}

#[test]
fn test_disconnected_graph_is_reported_not_failed() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--mutual", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph is disconnected"));

    assert!(dir.path().join("square-graph.json").exists());
}

#[test]
fn test_prune_writes_filtered_points() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--mutual", "1", "--prune", "--prefix", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph is connected"));

    let points = fs::read_to_string(dir.path().join("out-pruned.dat")).unwrap();
    assert_eq!(points.lines().count(), 2);
    assert!(dir.path().join("out-pruned-graph.bin").exists());
    assert!(dir.path().join("out-pruned-index.knn").exists());
}

#[test]
fn test_radius_complete_uses_knn_fallback() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, "0 0\n10 0\n0 10\n10 10\n");

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--radius", "1", "--complete", "--edgelist", "--sequential"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed:"));

    let graph = fs::read_to_string(dir.path().join("square-graph.edges")).unwrap();
    assert_eq!(graph.lines().filter(|l| !l.starts_with('#')).count(), 3);
}

#[test]
fn test_invalid_k_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--symmetric", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NNG-003"));

    assert!(!dir.path().join("square-graph.bin").exists());
    assert!(!dir.path().join("square-index.knn").exists());
}

#[test]
fn test_unreadable_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, "1 2\n3\n");

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--directed", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_supplies_options() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);
    let config = dir.path().join("graph.toml");
    fs::write(
        &config,
        "symmetric = 2\nlocal_scaling = 1\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    nngraph_cmd(dir.path())
        .arg(&data)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join("square-graph.json").exists());
}

#[test]
fn test_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);
    fs::write(dir.path().join("nngraph.toml"), "symmetric = 2\nprune = true\n").unwrap();

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--mutual", "1", "--complete", "--print-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mutual = 1"))
        .stdout(predicate::str::contains("complete = true"))
        .stdout(predicate::str::contains("symmetric").not());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .arg(&data)
        .args(["--directed", "1", "--config", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_environment_supplies_options() {
    let dir = TempDir::new().unwrap();
    let data = dataset(&dir, SQUARE_WITH_OUTLIER);

    nngraph_cmd(dir.path())
        .env("NNGRAPH_DIRECTED", "2")
        .arg(&data)
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("directed = 2"));
}
