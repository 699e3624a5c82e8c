use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::{CommandCargoExt, OutputAssertExt};
use predicates::prelude::predicate;

fn resource(name: &str) -> PathBuf {
    let mut path = project_root::get_project_root().unwrap();
    path.push(Path::new("resources"));
    path.push(name);
    path = path.canonicalize().unwrap();
    assert!(path.exists());
    path
}

#[test]
fn test_that_cli_app_produces_report() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("geotherm-cli")?;
    cmd.arg(resource("example1.txt"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SUMMARY OF RESULTS"))
        .stdout(predicate::str::contains("Electricity breakeven price"))
        .stdout(predicate::str::contains("USD/MWh"));
    Ok(())
}

#[test]
fn test_that_cli_app_writes_result_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let report = dir.path().join("example1.out");
    let json = dir.path().join("example1.json");
    let mut cmd = Command::cargo_bin("geotherm-cli")?;
    cmd.arg(resource("example1.txt"))
        .arg("--output")
        .arg(&report)
        .arg("--json")
        .arg(&json);
    cmd.assert().success();

    assert!(fs::read_to_string(&report)?.contains("CASE REPORT"));
    let result: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json)?)?;
    assert_eq!(result["Economics"]["LCOE"]["unit"], "USD/MWh");
    assert!(result["SUMMARY OF RESULTS"]["Electricity breakeven price"]["value"].is_number());
    Ok(())
}

#[test]
fn test_that_cli_app_runs_several_decks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("geotherm-cli")?;
    cmd.arg(resource("example1.txt"))
        .arg(resource("district_heating.txt"))
        .arg("--format")
        .arg("yaml")
        .arg("--output")
        .arg(dir.path().join("report.yaml"));
    cmd.assert().success();
    assert!(dir.path().join("report_example1.yaml").exists());
    assert!(dir.path().join("report_district_heating.yaml").exists());
    Ok(())
}

#[test]
fn test_that_missing_deck_runs_on_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut cmd = Command::cargo_bin("geotherm-cli")?;
    cmd.arg(dir.path().join("no-such-deck.txt"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SUMMARY OF RESULTS"))
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn test_that_fatal_error_exits_with_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let deck = dir.path().join("tough2.txt");
    fs::write(&deck, "Reservoir Model, 6, TOUGH2\n")?;
    let mut cmd = Command::cargo_bin("geotherm-cli")?;
    cmd.arg(&deck);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("TOUGH2 Executable Path"));
    Ok(())
}
