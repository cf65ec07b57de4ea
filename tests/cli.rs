//! Tests driving the espscope binary

use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;

fn espscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_espscope"))
}

/// Write `data` to a uniquely named file in the temp directory
fn temp_image(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("espscope-{}-{}.bin", std::process::id(), name));
    std::fs::write(&path, data).unwrap();
    path
}

fn run(cmd: &mut Command) -> (Option<i32>, Value) {
    let output = cmd.output().unwrap();
    let json = serde_json::from_slice(&output.stdout).unwrap();
    (output.status.code(), json)
}

#[test]
fn missing_argument() {
    let (code, json) = run(&mut espscope());
    assert_eq!(code, Some(1));
    assert_eq!(json["error"], "Usage: espscope <firmware.bin>");
}

#[test]
fn missing_file() {
    let (code, json) = run(espscope().arg("/nonexistent/espscope/firmware.bin"));
    assert_eq!(code, Some(1));
    assert_eq!(json, serde_json::json!({ "error": "File not found" }));
}

#[test]
fn empty_file_is_fatal() {
    let path = temp_image("empty", &[]);
    let (code, json) = run(espscope().arg(&path));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(code, Some(1));
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert!(obj.contains_key("error"));
}

#[test]
fn unknown_flag_is_reported_as_json() {
    let (code, json) = run(espscope().arg("--frobnicate"));
    assert_eq!(code, Some(1));
    assert!(json["error"].is_string());
}

#[test]
fn unrelated_file_gives_best_effort_report() {
    let path = temp_image("text", b"hello, this is not firmware\n");
    let (code, json) = run(espscope().arg(&path));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(code, Some(0));
    assert_eq!(json["chip"], "Unknown");
    assert_eq!(json["flash_size"], "Unknown");
    assert_eq!(json["is_full_image"], false);
    assert_eq!(json["bootloader_flash_size"], "Unknown");
    assert!(json.get("error").is_none());
}

#[test]
fn heuristic_header_report() {
    let mut data = vec![0xE9, 0x00, 0x02, 0x10, 0x00, 0x00, 0x08, 0x40];
    data.resize(24, 0xFF);
    let path = temp_image("heuristic", &data);
    let (code, json) = run(espscope().arg(&path));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(code, Some(0));
    assert_eq!(json["flash_mode"], "DIO");
    assert_eq!(json["flash_size_raw"], 1);
    assert_eq!(json["flash_freq"], "40MHz");
}

#[test]
fn verbose_output_keeps_stdout_json() {
    let path = temp_image("verbose", &[0xE9, 0, 2, 0x10, 0, 0, 0, 0]);
    let (code, json) = run(espscope().arg("-vv").arg(&path));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(code, Some(0));
    assert!(json.is_object());
}

#[test]
fn unreadable_path_is_fatal() {
    let dir = std::env::temp_dir();
    let (code, json) = run(espscope().arg(&dir));

    assert_eq!(code, Some(1));
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert!(obj["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to read file:"));
}
