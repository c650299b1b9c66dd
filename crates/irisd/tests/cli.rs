use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn irisd(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_irisd"))
        .env("IRISD_CONFIG_DIR", root.join("config"))
        .env("IRISD_CACHE_DIR", root.join("cache"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run irisd")
}

#[test]
fn geometry_prints_ring_json() {
    let root = TempDir::new().unwrap();
    let output = irisd(root.path(), &["geometry"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rings = report["rings"].as_array().unwrap();
    assert_eq!(rings.len(), report["params"]["ring_count"].as_u64().unwrap() as usize);

    let first = &rings[0];
    let points = first["points"].as_array().unwrap();
    assert_eq!(points.first(), points.last());
    assert!(first["radius"].as_f64().unwrap() > 0.0);
}

#[test]
fn export_writes_png() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("iris.png");
    let status = irisd(
        root.path(),
        &["export", "--out", out.to_str().unwrap(), "--size", "48", "--time", "1.5"],
    )
    .status;
    assert!(status.success());

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn fallback_writes_png() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("disc.png");
    let status = irisd(
        root.path(),
        &["fallback", "--out", out.to_str().unwrap(), "--size", "32"],
    )
    .status;
    assert!(status.success());
    assert!(out.metadata().unwrap().len() > 0);
}

#[test]
fn export_rejects_unwritable_destination() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("missing").join("iris.png");
    let status = irisd(root.path(), &["export", "--out", out.to_str().unwrap()]).status;
    assert!(!status.success());
}

#[test]
fn config_check_accepts_defaults_and_valid_files() {
    let root = TempDir::new().unwrap();
    assert!(irisd(root.path(), &["config", "check"]).status.success());

    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "version = 1\n\n[motion]\nreduced = \"reduce\"\n\n[palette]\nprimary = \"#102030\"\n",
    )
    .unwrap();
    let output = irisd(root.path(), &["config", "check"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("configuration OK"));
}

#[test]
fn config_check_rejects_invalid_files() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(config_dir.join("config.toml"), "version = 7\n").unwrap();
    assert!(!irisd(root.path(), &["config", "check"]).status.success());

    fs::write(
        config_dir.join("config.toml"),
        "version = 1\n[palette]\nglint = \"gold\"\n",
    )
    .unwrap();
    assert!(!irisd(root.path(), &["config", "check"]).status.success());
}

#[test]
fn explicit_config_must_exist() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("nowhere.toml");
    let status = irisd(
        root.path(),
        &["--config", missing.to_str().unwrap(), "config", "check"],
    )
    .status;
    assert!(!status.success());
}

#[test]
fn config_default_round_trips_through_check() {
    let root = TempDir::new().unwrap();
    let output = irisd(root.path(), &["config", "default"]);
    assert!(output.status.success());
    let toml = String::from_utf8(output.stdout).unwrap();
    assert!(toml.contains("version = 1"));

    let path = root.path().join("written.toml");
    fs::write(&path, toml).unwrap();
    let status = irisd(
        root.path(),
        &["--config", path.to_str().unwrap(), "config", "check"],
    )
    .status;
    assert!(status.success());
}
