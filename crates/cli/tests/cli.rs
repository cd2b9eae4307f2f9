use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn plastevo() -> Command {
    Command::cargo_bin("plastevo").unwrap()
}

/// Write a small configuration with `init`.
fn write_config(path: &Path, regime: &str) {
    plastevo()
        .arg("init")
        .arg("--output")
        .arg(path)
        .args(["--population-size", "60", "--generations", "3", "--lifetime", "2"])
        .args(["--regime", regime, "--seed", "42"])
        .assert()
        .success();
}

#[test]
fn test_init_writes_config() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");

    plastevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .args(["--population-size", "10", "--generations", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Population size: 10"))
        .stdout(predicate::str::contains("Generations: 50"))
        .stdout(predicate::str::contains("Configuration written to"));

    let json = std::fs::read_to_string(&config).unwrap();
    assert!(json.contains("\"population_size\": 10"));
    assert!(json.contains("\"moderate\""));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");
    write_config(&config, "constant");

    plastevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    plastevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_init_rejects_invalid_values() {
    let temp = tempdir().unwrap();

    plastevo()
        .arg("init")
        .arg("--output")
        .arg(temp.path().join("bad_rate.json"))
        .args(["--mutation-rate", "2.0"])
        .assert()
        .failure();

    plastevo()
        .arg("init")
        .arg("--output")
        .arg(temp.path().join("bad_regime.json"))
        .args(["--regime", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid regime"));
}

#[test]
fn test_run_in_memory() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");
    write_config(&config, "constant");

    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .args(["--replicates", "2", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replicate 1"))
        .stdout(predicate::str::contains("Survivors: 2/2"))
        .stdout(predicate::str::contains("Simulation complete!"));
}

#[test]
fn test_run_records_and_info_reads_back() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");
    let db = temp.path().join("run.db");
    write_config(&config, "constant");

    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&db)
        .args(["--record", "every:2", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 3 summaries"));

    plastevo()
        .arg("info")
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recording: every:2"))
        .stdout(predicate::str::contains("survived 3 generations"))
        .stdout(predicate::str::contains("Reaction norm"));

    // An existing database is never overwritten
    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&db)
        .assert()
        .failure();
}

#[test]
fn test_run_seeded_from_recorded_run() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");
    let first = temp.path().join("constant.db");
    let second = temp.path().join("variable.db");
    write_config(&config, "constant");

    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&first)
        .arg("--no-progress")
        .assert()
        .success();

    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&second)
        .arg("--seed-from")
        .arg(&first)
        .args(["--regime", "variable", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Regime: variable"))
        // Three generations of two steps each
        .stdout(predicate::str::contains("Start time: 6"));
}

#[test]
fn test_payoff_of_recorded_run() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("config.json");
    let db = temp.path().join("run.db");
    write_config(&config, "constant");

    plastevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&db)
        .args(["--replicates", "2", "--no-progress"])
        .assert()
        .success();

    let output = plastevo()
        .arg("payoff")
        .arg("--database")
        .arg(&db)
        .args(["--seed", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "replicate\tmean_payoff\tgeneration_payoffs");
    assert_eq!(lines.len(), 3);
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split('\t').collect();
        let mean: f64 = fields[1].parse().unwrap();
        assert!((0.0..=1.0).contains(&mean));
        // One generation per period unit of the slowest patch
        assert_eq!(fields[2].split(',').count(), 100);
    }

    plastevo()
        .arg("payoff")
        .arg("--database")
        .arg(temp.path().join("missing.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_rejects_bad_recording_strategy() {
    plastevo()
        .arg("run")
        .args(["--record", "sometimes", "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid recording strategy"));
}

#[test]
fn test_info_missing_database() {
    let temp = tempdir().unwrap();
    plastevo()
        .arg("info")
        .arg("--database")
        .arg(temp.path().join("missing.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_environment_series() {
    plastevo()
        .arg("environment")
        .args(["--patch", "warm", "--steps", "4", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("patch\ttime\tstate\tcue"))
        .stdout(predicate::str::contains("warm\t3\t"))
        .stdout(predicate::str::contains("cold").not());

    plastevo()
        .arg("environment")
        .args(["--patch", "tropical"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown patch"));
}
