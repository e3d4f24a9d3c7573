#![cfg(all(unix, feature = "cli"))]

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use logbuf::buffer::{AtomicBuffer, TermBuffer};
use logbuf::frame::descriptor::{
    align, length_offset, session_id_offset, stream_id_offset, term_id_offset,
    term_offset_offset, type_offset, FRAME_ALIGNMENT, HDR_TYPE_DATA, HDR_TYPE_PAD,
    HEADER_LENGTH, TERM_MIN_LENGTH,
};
use serde_json::Value;

const INITIAL_TERM_ID: i32 = 7;

fn append(buffer: &AtomicBuffer, offset: usize, frame_type: u16, payload: &[u8]) -> usize {
    let frame_length = HEADER_LENGTH + payload.len();
    // SAFETY: the test is the only writer and commits each frame after filling it.
    unsafe {
        buffer.put_u16(type_offset(offset), frame_type);
        buffer.put_i32(term_offset_offset(offset), offset as i32);
        buffer.put_i32(session_id_offset(offset), 42);
        buffer.put_i32(stream_id_offset(offset), 1001);
        buffer.put_i32(term_id_offset(offset), INITIAL_TERM_ID);
        buffer.put_bytes(offset + HEADER_LENGTH, payload);
        buffer.put_i32_ordered(length_offset(offset), frame_length as i32);
    }
    offset + align(frame_length, FRAME_ALIGNMENT)
}

fn logbuf(args: &[&str], path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logbuf"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .args(args)
        .arg(path)
        .output()
        .expect("logbuf should run")
}

fn spawn_logbuf(args: &[&str], path: &Path) -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_logbuf"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("logbuf should start")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be json"))
        .collect()
}

#[test]
fn scan_prints_data_fragments_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    let buffer = AtomicBuffer::create_file(&path, TERM_MIN_LENGTH).unwrap();

    let mut offset = append(&buffer, 0, HDR_TYPE_DATA, b"hello");
    offset = append(&buffer, offset, HDR_TYPE_PAD, &[0u8; 40]);
    offset = append(&buffer, offset, HDR_TYPE_DATA, b"world");

    let output = logbuf(&["scan", "--initial-term-id", "7"], &path);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["kind"], "fragment");
    assert_eq!(lines[0]["payload"], "hello");
    assert_eq!(lines[0]["frame_offset"], 0);
    assert_eq!(lines[0]["session_id"], 42);
    assert_eq!(lines[0]["stream_id"], 1001);
    assert_eq!(lines[1]["payload"], "world");
    assert_eq!(lines[2]["kind"], "summary");
    assert_eq!(lines[2]["fragments"], 2);
    assert_eq!(lines[2]["next_offset"], offset);
    assert_eq!(lines[2]["stop"], "tail");
}

#[test]
fn scan_honours_offset_and_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    let buffer = AtomicBuffer::create_file(&path, TERM_MIN_LENGTH).unwrap();

    let second = append(&buffer, 0, HDR_TYPE_DATA, b"one");
    let third = append(&buffer, second, HDR_TYPE_DATA, b"two");
    append(&buffer, third, HDR_TYPE_DATA, b"three");

    let offset = second.to_string();
    let output = logbuf(&["scan", "--offset", offset.as_str(), "--limit", "1"], &path);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["payload"], "two");
    assert_eq!(lines[1]["fragments"], 1);
    assert_eq!(lines[1]["next_offset"], third);
    assert_eq!(lines[1]["stop"], "limit");
}

#[test]
fn scan_rejects_misaligned_term_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.logbuffer");
    std::fs::write(&path, vec![0u8; TERM_MIN_LENGTH + FRAME_ALIGNMENT + 1]).unwrap();

    let output = logbuf(&["scan"], &path);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a positive multiple"));
}

#[test]
fn scan_rejects_unaligned_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    AtomicBuffer::create_file(&path, TERM_MIN_LENGTH).unwrap();

    let output = logbuf(&["scan", "--offset", "3"], &path);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn layout_reports_constants() {
    let output = Command::new(env!("CARGO_BIN_EXE_logbuf"))
        .args(["--format", "json", "layout"])
        .output()
        .expect("logbuf should run");
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["frame_alignment"], FRAME_ALIGNMENT);
    assert_eq!(lines[0]["header_length"], HEADER_LENGTH);
    assert_eq!(lines[0]["padding_frame_type"], 0);
    assert_eq!(lines[0]["fields"][3]["name"], "type");
    assert_eq!(lines[0]["fields"][3]["offset"], 6);
}

#[test]
fn follow_keeps_polling_until_term_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    let buffer = AtomicBuffer::create_file(&path, TERM_MIN_LENGTH).unwrap();

    let mut offset = append(&buffer, 0, HDR_TYPE_DATA, b"first");
    let child = spawn_logbuf(&["scan", "--follow", "--idle-ms", "1"], &path);

    thread::sleep(Duration::from_millis(200));
    offset = append(&buffer, offset, HDR_TYPE_DATA, b"second");
    thread::sleep(Duration::from_millis(100));
    let padding = vec![0u8; TERM_MIN_LENGTH - offset - HEADER_LENGTH];
    let end = append(&buffer, offset, HDR_TYPE_PAD, &padding);
    assert_eq!(end, TERM_MIN_LENGTH);

    let output = child.wait_with_output().expect("logbuf should exit");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["payload"], "first");
    assert_eq!(lines[1]["payload"], "second");
    assert_eq!(lines[2]["kind"], "summary");
    assert_eq!(lines[2]["fragments"], 2);
    assert_eq!(lines[2]["next_offset"], TERM_MIN_LENGTH);
    assert_eq!(lines[2]["stop"], "end");
}

#[test]
fn create_makes_scannable_term_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    let length = (TERM_MIN_LENGTH * 2).to_string();

    let output = logbuf(&["create", "--term-length", length.as_str()], &path);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines = json_lines(&output);
    assert_eq!(lines[0]["kind"], "created");
    assert_eq!(lines[0]["term_length"], TERM_MIN_LENGTH * 2);
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        (TERM_MIN_LENGTH * 2) as u64
    );

    let output = logbuf(&["scan"], &path);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines[0]["fragments"], 0);
    assert_eq!(lines[0]["stop"], "tail");
}

#[test]
fn create_rejects_invalid_term_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");

    for length in ["4096", "100000"] {
        let output = logbuf(&["create", "--term-length", length], &path);
        assert_eq!(output.status.code(), Some(64), "length {length}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("power of two"));
    }
    assert!(!path.exists());
}

#[test]
fn create_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term.logbuffer");
    let buffer = AtomicBuffer::create_file(&path, TERM_MIN_LENGTH).unwrap();
    append(&buffer, 0, HDR_TYPE_DATA, b"keep");

    let output = logbuf(&["create"], &path);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(buffer.get_i32_volatile(length_offset(0)), (HEADER_LENGTH + 4) as i32);

    let output = logbuf(&["create", "--force"], &path);
    assert!(output.status.success());
}

#[test]
fn version_extended_reports_features_and_layout() {
    let output = Command::new(env!("CARGO_BIN_EXE_logbuf"))
        .args(["version", "--extended"])
        .output()
        .expect("logbuf should run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("features: cli"));
    assert!(stdout.contains(&format!("frame_alignment: {FRAME_ALIGNMENT}")));
    assert!(stdout.contains(&format!("header_length: {HEADER_LENGTH}")));
}
