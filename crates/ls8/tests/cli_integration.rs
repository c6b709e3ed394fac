//! Integration tests for the ls8 CLI.

use env_logger as _;
use log as _;
use ls8 as _;
use ls8_core as _;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror as _;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(format!("{name}.ls8"))
}

fn run_ls8(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ls8"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ls8")
}

fn run_demo(name: &str, extra: &[&str]) -> Output {
    let path = demo(name);
    let mut args = vec![path.to_str().expect("utf-8 path")];
    args.extend_from_slice(extra);
    run_ls8(&args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn demos_print_expected_output() {
    for (name, expected) in [
        ("print8", "8\n"),
        ("mult", "72\n"),
        ("stack", "3\n2\n1\n"),
        ("call", "20\n30\n36\n"),
        ("interrupt", "A\n7\n"),
        ("printstr", "Hello, world!\n"),
    ] {
        let output = run_demo(name, &[]);
        assert_eq!(output.status.code(), Some(0), "{name}: {}", stderr(&output));
        assert_eq!(stdout(&output), expected, "{name}");
    }
}

#[test]
fn paced_run_produces_same_output() {
    let output = run_demo("mult", &["--hz", "1000"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "72\n");
}

#[test]
fn binary_image_runs() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("add.bin");
    // LDI R0,8; LDI R1,9; ADD R0,R1; PRN R0; HLT
    fs::write(
        &image,
        [0x99, 0, 8, 0x99, 1, 9, 0xA8, 0, 1, 0x43, 0, 0x01],
    )
    .expect("write image");

    let output = run_ls8(&[image.to_str().expect("utf-8 path"), "--binary"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "17\n");
}

#[test]
fn illegal_opcode_exits_with_failure() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("bad.ls8");
    fs::write(&image, "00000000 # NOP\n11111111\n").expect("write image");

    let output = run_ls8(&[image.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("illegal opcode 0b11111111 at address 0x01"));
}

#[test]
fn malformed_image_reports_line() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("typo.ls8");
    fs::write(&image, "# header\n00000001\n1001100\n").expect("write image");

    let output = run_ls8(&[image.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("line 3"));
}

#[test]
fn missing_image_file_fails() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("absent.ls8");

    let output = run_ls8(&[image.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn step_limit_exit_code() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("spin.ls8");
    fs::write(&image, "10011001\n00000000\n00000000\n01010000 # JMP R0\n00000000\n")
        .expect("write image");

    let output = run_ls8(&[image.to_str().expect("utf-8 path"), "--max-steps", "50"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("step limit of 50"));
}

#[test]
fn trace_and_dump_go_to_stderr() {
    let output = run_demo("print8", &["--trace", "--dump"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "8\n");

    let err = stderr(&output);
    assert!(err.contains("00: 99 00 08  LDI R0, 8"));
    assert!(err.contains("PRN R0"));
    assert!(err.contains("R0=08"));
    assert!(err.contains("PC=06 FL=00000000 SP=F4"));
}

#[test]
fn usage_errors_exit_with_two() {
    assert_eq!(run_ls8(&[]).status.code(), Some(2));
    assert_eq!(run_ls8(&["prog.ls8", "--bogus"]).status.code(), Some(2));

    let zero_rate = run_demo("print8", &["--hz", "0"]);
    assert_eq!(zero_rate.status.code(), Some(2));
    assert!(stderr(&zero_rate).contains("at least 1 Hz"));
}

#[test]
fn help_prints_usage() {
    let output = run_ls8(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Usage: ls8"));
}

#[test]
fn list_prints_disassembly_without_running() {
    let output = run_demo("mult", &["--list"]);
    assert_eq!(output.status.code(), Some(0));

    let listing = stdout(&output);
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        [
            "00: 99 00 08  LDI R0, 8",
            "03: 99 01 09  LDI R1, 9",
            "06: AA 00 01  MUL R0, R1",
            "09: 43 00     PRN R0",
            "0B: 01        HLT",
        ]
    );
}

#[test]
fn snapshot_records_final_state_as_json() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let snapshot = temp_dir.path().join("state.json");

    let output = run_demo("mult", &["--snapshot", snapshot.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(0));

    let json: Value =
        serde_json::from_str(&fs::read_to_string(&snapshot).expect("snapshot written"))
            .expect("valid json");
    assert_eq!(json["version"], "V1");
    assert_eq!(json["state"]["run_state"], "Halted");
    assert_eq!(json["state"]["registers"]["gpr"][0], 72);
    assert_eq!(json["state"]["registers"]["pc"], 12);
    assert_eq!(
        json["state"]["memory"].as_array().map(Vec::len),
        Some(256)
    );
}

#[test]
fn dump_reports_latched_fault() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let image = temp_dir.path().join("div0.ls8");
    // LDI R0,10; DIV R0,R1
    fs::write(&image, "10011001\n00000000\n00001010\n10101011\n00000000\n00000001\n")
        .expect("write image");

    let output = run_ls8(&[image.to_str().expect("utf-8 path"), "--dump"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("FAULT Numeric:"));
    assert!(stderr(&output).contains("PC=03"));
}
