//! Exit codes and output of the `save-states` and `montepi` binaries.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const ENV_VARS: [&str; 9] = [
    "MONTEPI_INTERVAL",
    "MONTEPI_STATES",
    "MONTEPI_OUTPUT",
    "MONTEPI_ALGORITHM",
    "MONTEPI_SEED",
    "MONTEPI_RNG_STATES",
    "MONTEPI_THREADS",
    "MONTEPI_THROWS",
    "RUST_LOG",
];

fn run(bin: &str, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.args(args).output().expect("failed to launch binary")
}

fn save_states(args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_save-states"), args)
}

fn montepi(args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_montepi"), args)
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is UTF-8")
}

fn write_states(dir: &TempDir, states: &str) -> String {
    let path = dir.path().join(format!("states_{states}.dat"));
    let path = path_str(&path).to_string();
    let out = save_states(&["-q", "-i", "1000", "-s", states, "-f", &path]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    path
}

#[test]
fn test_list_types_prints_algorithms() {
    let out = save_states(&["-t"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "taus\nchacha8\nchacha20\n");
}

#[test]
fn test_generate_then_sample_succeeds() {
    let dir = TempDir::new().unwrap();
    let states = write_states(&dir, "4");

    let out = montepi(&["-q", "-s", "-r", &states, "-p", "4", "-t", "400000"]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "{stdout}");
    assert!(lines[0].starts_with("Started "), "{stdout}");
    assert!(lines[1].ends_with(" milliseconds"), "{stdout}");
    assert!(lines[2].contains("/400000 = "), "{stdout}");
    assert!(lines[3].starts_with("Completed "), "{stdout}");
}

#[test]
fn test_usage_error_exits_1() {
    // -r is mandatory
    assert_eq!(montepi(&["-p", "2"]).status.code(), Some(1));
    // counts must be positive
    assert_eq!(save_states(&["-i", "0", "-s", "4"]).status.code(), Some(1));
    assert_eq!(save_states(&["-s", "4"]).status.code(), Some(1));
}

#[test]
fn test_help_exits_0() {
    let out = montepi(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Exit codes:"));
}

#[test]
fn test_unwritable_output_exits_2() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no_such_dir").join("states.dat");
    let out = save_states(&["-q", "-i", "10", "-s", "2", "-f", path_str(&missing)]);
    assert_eq!(out.status.code(), Some(2), "{out:?}");

    let states = write_states(&dir, "1");
    let report = dir.path().join("no_such_dir").join("report.txt");
    let out = montepi(&["-q", "-r", &states, "-t", "100", "-f", path_str(&report)]);
    assert_eq!(out.status.code(), Some(2), "{out:?}");
}

#[test]
fn test_missing_checkpoint_source_exits_3() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.dat");
    let out = montepi(&["-q", "-r", path_str(&missing), "-t", "100"]);
    assert_eq!(out.status.code(), Some(3), "{out:?}");
    assert!(out.stdout.is_empty());
}

#[test]
fn test_short_checkpoint_source_exits_4() {
    let dir = TempDir::new().unwrap();
    let states = write_states(&dir, "2");
    let out = montepi(&["-q", "-r", &states, "-p", "3", "-t", "300"]);
    assert_eq!(out.status.code(), Some(4), "{out:?}");
    assert!(out.stdout.is_empty());
}

#[test]
fn test_corrupt_checkpoint_source_exits_4() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.dat");
    std::fs::write(&path, b"not a checkpoint file at all").unwrap();
    let out = montepi(&["-q", "-r", path_str(&path), "-t", "100"]);
    assert_eq!(out.status.code(), Some(4), "{out:?}");
}
