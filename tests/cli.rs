//! CLI tests spawning the real binary with stub tool scripts.
//!
//! The external tools are stood in for by small shell scripts wired up
//! through the harness config, so these tests exercise the whole path:
//! config load, subprocess spawn, log capture, and result printing.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use regbench::test_support::write_file;

/// Write an executable stub script and return its absolute path.
fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = write_file(dir, name, &format!("#!/bin/sh\n{body}\n"));
    let mut perms = fs::metadata(&path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

fn regbench(dir: &Path, harness: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_regbench"))
        .current_dir(dir)
        .arg("--harness")
        .arg(harness)
        .args(args)
        .output()
        .expect("run regbench")
}

#[test]
fn pfire_run_prints_paths_scraped_from_log() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stub = write_stub(
        temp.path(),
        "fake_pfire",
        "echo preamble\necho \"Saved registered image to out/reg.img\"\necho \"Saved map to out/reg.map\"",
    );
    let harness = write_file(
        temp.path(),
        "harness.toml",
        &format!("pfire_command = \"{}\"\n", stub.display()),
    );
    write_file(temp.path(), "run1.cfg", "fixed = a.png\nmoved = b.png\n");

    let output = regbench(temp.path(), &harness, &["pfire", "run1.cfg"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("registered: ./out/reg.img"));
    assert!(stdout.contains("map: ./out/reg.map"));
    let log = fs::read_to_string(temp.path().join("run1_pfire.log")).expect("read log");
    assert!(log.contains("preamble"));
}

#[test]
fn pfire_failure_exits_nonzero_and_names_log() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stub = write_stub(temp.path(), "fake_pfire", "echo diverged\nexit 2");
    let harness = write_file(
        temp.path(),
        "harness.toml",
        &format!("pfire_command = \"{}\"\n", stub.display()),
    );
    write_file(temp.path(), "run1.cfg", "fixed = a.png\nmoved = b.png\n");

    let output = regbench(temp.path(), &harness, &["pfire", "run1.cfg"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run1_pfire.log"));
    // The log stays behind as a diagnostic artifact.
    let log = fs::read_to_string(temp.path().join("run1_pfire.log")).expect("read log");
    assert!(log.contains("diverged"));
}

#[test]
fn pfire_rejects_multi_process_runs() {
    let temp = tempfile::tempdir().expect("tempdir");
    let harness = temp.path().join("missing.toml");
    write_file(temp.path(), "run1.cfg", "fixed = a.png\nmoved = b.png\n");

    let output = regbench(temp.path(), &harness, &["pfire", "run1.cfg", "--procs", "4"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not supported"));
}

#[test]
fn shirt_run_produces_deterministic_paths_as_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stub = write_stub(temp.path(), "fake_shirt", "echo \"shirt $1\"");
    let harness = write_file(
        temp.path(),
        "harness.toml",
        &format!("shirt_command = \"{}\"\n", stub.display()),
    );
    write_file(
        temp.path(),
        "run2.cfg",
        "fixed = a.image\nmoved = b.image\nmask = roi.image\nnodespacing = 5\n",
    );

    let output = regbench(temp.path(), &harness, &["--json", "shirt", "run2.cfg"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse result json");
    assert_eq!(result["registered_path"], "shirt_run2_registered.image");
    assert_eq!(result["map_path"], "shirt_run2_map.map");
    assert_eq!(result["log_path"], "run2_shirt.log");

    // Both the setpath and register calls land in one log.
    let log = fs::read_to_string(temp.path().join("run2_shirt.log")).expect("read log");
    assert!(log.contains("shirt setpath"));
    assert!(log.contains("shirt Register"));
}
