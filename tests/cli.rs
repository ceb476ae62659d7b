//! Runs the cavern-gen binary against maps in a temp directory.

use std::fs;
use std::process::Command;

const MAP: &str = "0,1,2\n3,4,5\n6,7,8\n";

fn cavern_gen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cavern-gen"))
}

#[test]
fn test_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("map.csv");
    fs::write(&input, MAP).unwrap();
    let out = dir.path().join("gen").join("cavern.csv");
    let labeled = dir.path().join("gen").join("labeled.csv");
    let png = dir.path().join("gen").join("cavern.png");

    let status = cavern_gen()
        .arg("--input")
        .arg(&input)
        .args(["-n", "2", "--width", "5", "--height", "4", "--seed", "3"])
        .arg("--out")
        .arg(&out)
        .arg("--labeled")
        .arg(&labeled)
        .arg("--png")
        .arg(&png)
        .status()
        .unwrap();
    assert!(status.success());

    let csv = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.split(',').count() == 6));

    let labeled_text = fs::read_to_string(&labeled).unwrap();
    assert_eq!(labeled_text.lines().count(), 6);
    assert!(png.exists());
}

#[test]
fn test_prints_csv_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), MAP).unwrap();

    let output = cavern_gen()
        .arg("--input-dir")
        .arg(dir.path())
        .args(["-n", "1", "--width", "4", "--height", "3", "--no-periodic"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.lines().all(|r| r.split(',').count() == 4));
}

#[test]
fn test_same_seed_same_map() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("map.csv");
    fs::write(&input, MAP).unwrap();

    let run = || {
        let output = cavern_gen()
            .arg("--input")
            .arg(&input)
            .args(["-n", "1", "--width", "8", "--height", "8", "--seed", "77"])
            .output()
            .unwrap();
        assert!(output.status.success());
        output.stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_failures_exit_nonzero() {
    let output = cavern_gen().output().unwrap();
    assert!(!output.status.success());

    let output = cavern_gen().arg("--frobnicate").output().unwrap();
    assert!(!output.status.success());

    let dir = tempfile::tempdir().unwrap();
    let output = cavern_gen()
        .arg("--input-dir")
        .arg(dir.path().join("missing"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_help() {
    let output = cavern_gen().arg("--help").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--input-dir"));
}
