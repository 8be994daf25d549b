//! Writing decoded responses to disk

use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use tzparse::capture::{ErrorPolicy, Framing};
use tzparse::export::export_filename;
use tzparse::{Capture, DecodeOptions, Exporter};

use crate::helpers::{length_prefixed_block, sample_capture, stored_response};

fn decoded() -> Capture {
    Capture::decode(&sample_capture(), &DecodeOptions::default()).unwrap()
}

#[test]
fn writes_one_file_per_response() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("dump");

    let written = Exporter::new(&out).export(&decoded()).unwrap();
    assert_eq!(written.len(), 5);
    assert_eq!(written[0], out.join("0000_000_hello.json"));
    assert_eq!(written[1], out.join("0000_001_ping.json"));
    assert_eq!(written[4], out.join("0001_001_ping.json"));

    let mut names: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names.len(), 5);
    assert_eq!(names[3], export_filename(1, 0, "bye"));
}

#[test]
fn documents_carry_location_and_content() {
    let temp = TempDir::new().unwrap();
    let written = Exporter::new(temp.path()).export(&decoded()).unwrap();

    let text = fs::read_to_string(&written[2]).unwrap();
    assert!(text.contains('\n'));
    let document: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["block"], 0);
    assert_eq!(document["index"], 2);
    assert_eq!(document["type"], "ping");
    assert_eq!(document["compression_format"], "LZ4");
    assert_eq!(document["strategy"]["kind"], "lz4_stored");
    assert_eq!(document["content"]["n"], 2);
}

#[test]
fn content_only_compact_export() {
    let temp = TempDir::new().unwrap();
    let written = Exporter::new(temp.path())
        .pretty(false)
        .content_only(true)
        .export(&decoded())
        .unwrap();

    let text = fs::read_to_string(&written[4]).unwrap();
    assert_eq!(text, r#"{"n":3}"#);
}

#[test]
fn export_into_a_file_path_fails() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("taken");
    fs::write(&blocker, "x").unwrap();

    let error = Exporter::new(&blocker).export(&decoded()).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to create export directory"));
}

#[test]
fn best_effort_export_keeps_positions_after_a_failure() {
    let bytes = length_prefixed_block(&[
        stored_response("a", r#"{"i":0}"#),
        stored_response("bad", "{oops"),
        stored_response("c", r#"{"i":2}"#),
    ]);
    let options = DecodeOptions::default()
        .with_framing(Framing::LengthPrefixed)
        .with_policy(ErrorPolicy::BestEffort);
    let capture = Capture::decode(&bytes, &options).unwrap();
    assert_eq!(capture.failures[0].response_index, Some(1));

    let temp = TempDir::new().unwrap();
    let written = Exporter::new(temp.path()).export(&capture).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0], temp.path().join("0000_000_a.json"));
    assert_eq!(written[1], temp.path().join("0000_002_c.json"));

    let document: Value =
        serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(document["index"], 2);
    assert_eq!(document["content"]["i"], 2);
}
