use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn swmm() -> Command {
    Command::cargo_bin("swmm").unwrap()
}

#[test]
fn swmm_sections_lists_registry() {
    swmm()
        .arg("sections")
        .assert()
        .success()
        .stdout(predicate::str::contains("JUNCTIONS"))
        .stdout(predicate::str::contains("SWMM_conduits"));
}

#[test]
fn swmm_import_writes_layers_and_sheets() {
    let out = tempdir().unwrap();
    let input = repo_path("test_data/swmm/simple.inp");
    swmm()
        .args(["import", input.to_str().unwrap(), "--out"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Layers"));

    assert!(out.path().join("SWMM_junctions.geojson").exists());
    assert!(out.path().join("SWMM_subcatchments.geojson").exists());
    assert!(out.path().join("curves").join("Rating.csv").exists());
    assert!(out.path().join("verbatim").join("MAP.txt").exists());
}

#[test]
fn swmm_export_round_trip() {
    let work = tempdir().unwrap();
    let layers = work.path().join("layers");
    let inp = work.path().join("model.inp");
    let input = repo_path("test_data/swmm/simple.inp");

    swmm()
        .args(["import", input.to_str().unwrap(), "--out"])
        .arg(&layers)
        .assert()
        .success();
    swmm()
        .arg("export")
        .arg(&layers)
        .arg("--inp")
        .arg(&inp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let text = fs::read_to_string(&inp).unwrap();
    assert!(text.contains("[JUNCTIONS]"));
    assert!(text.contains("[VERTICES]"));
    assert!(text.contains(";Upstream manhole"));
}

#[test]
fn swmm_import_missing_file_fails() {
    let out = tempdir().unwrap();
    swmm()
        .args(["import", "does/not/exist.inp", "--out"])
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn swmm_rejects_bad_config() {
    let work = tempdir().unwrap();
    let config = work.path().join("swmm.toml");
    fs::write(&config, "[logging]\nlevel = \"loud\"\n").unwrap();
    swmm()
        .arg("sections")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}
