//! Unit tests for response decoding through the public API

use chrono::{Local, TimeZone};
use serde_json::json;

use tzparse::capture::{
    CaptureError, CompressionFormat, DecodeStrategy, Response, ResponseSlice,
};

use crate::helpers::{
    lz4_response, response, stored_response, zstd_response, zstd_response_late,
};

fn decode(bytes: &[u8]) -> Result<Response, CaptureError> {
    Response::decode(&ResponseSlice {
        index: 0,
        offset: 0x100,
        bytes,
    })
}

#[test]
fn sentinel_body_is_literal_text() {
    let json = r#"{"kind":"literal","items":[1,2,3]}"#;
    let response = decode(&stored_response("state", json)).unwrap();

    assert_eq!(response.compression_format, CompressionFormat::Lz4);
    assert_eq!(response.strategy, DecodeStrategy::Lz4Stored);
    assert_eq!(response.decompressed_size, json.len());
    assert_eq!(response.content["kind"], "literal");
}

#[test]
fn lz4_block_fills_declared_output() {
    let json = format!(r#"{{"pad":"{}"}}"#, "ab".repeat(45));
    assert_eq!(json.len(), 100);

    let bytes = lz4_response("bulk", &json);
    let response = decode(&bytes).unwrap();
    match response.strategy {
        DecodeStrategy::Lz4Block {
            decompressed_len,
            compressed_len,
        } => {
            assert_eq!(decompressed_len, 100);
            assert_eq!(
                compressed_len as usize,
                lz4_flex::block::compress(json.as_bytes()).len()
            );
        }
        other => panic!("Expected Lz4Block, got {other:?}"),
    }
    assert_eq!(response.decompressed_size, 100);
}

#[test]
fn lz4_compressed_length_beyond_range_fails() {
    let mut body = vec![0x00, 0x22, 0x00];
    body.extend_from_slice(&100u32.to_le_bytes());
    body.extend_from_slice(&40u32.to_le_bytes());
    body.extend_from_slice(&[0u8; 12]);

    match decode(&response("bulk", "lz4", &body)).unwrap_err() {
        CaptureError::DecompressionFailure { format, range, .. } => {
            assert_eq!(format, CompressionFormat::Lz4);
            assert_eq!(range.start, 0x100);
        }
        other => panic!("Expected DecompressionFailure, got {other:?}"),
    }
}

#[test]
fn zstd_offsets_are_tried_in_order() {
    let early = decode(&zstd_response("a", "{}")).unwrap();
    let late = decode(&zstd_response_late("a", "{}")).unwrap();
    assert_eq!(early.strategy, DecodeStrategy::Zstd { offset: 2 });
    assert_eq!(late.strategy, DecodeStrategy::Zstd { offset: 3 });
    assert_eq!(early.content, late.content);
}

#[test]
fn decoding_is_deterministic() {
    for bytes in [
        zstd_response("z", r#"{"a":[1,2,{"b":null}]}"#),
        lz4_response("l", r#"{"a":"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"}"#),
        stored_response("s", r#"{"a":true}"#),
    ] {
        let first = decode(&bytes).unwrap();
        let second = decode(&bytes).unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first.decompressed_size, second.decompressed_size);
        assert_eq!(first.strategy, second.strategy);
    }
}

#[test]
fn embedded_timestamp_is_local_time() {
    let response = decode(&zstd_response(
        "clock",
        r#"{"data":{"ts":1700000000000}}"#,
    ))
    .unwrap();

    assert!(response.has_timestamp());
    let expected = Local.timestamp_millis_opt(1_700_000_000_000).unwrap();
    assert_eq!(response.timestamp, Some(expected));
}

#[test]
fn zero_or_missing_timestamp_is_absent() {
    for json in [r#"{"data":{"ts":0}}"#, r#"{"data":{}}"#, r#"{"ts":5}"#, "null"] {
        let response = decode(&stored_response("t", json)).unwrap();
        assert!(!response.has_timestamp(), "{json}");
    }
}

#[test]
fn non_object_content_is_rejected() {
    for json in ["[1,2]", "42", r#""text""#, "{broken"] {
        let error = decode(&stored_response("t", json)).unwrap_err();
        assert!(
            matches!(error, CaptureError::ContentParseError { .. }),
            "{json}: {error:?}"
        );
    }
}

#[test]
fn unknown_tag_is_reported_with_range() {
    let bytes = response("t", "gzip", &[0; 8]);
    match decode(&bytes).unwrap_err() {
        CaptureError::UnknownCompressionFormat { tag, range } => {
            assert_eq!(tag, "gzip");
            assert_eq!(range.len(), bytes.len());
        }
        other => panic!("Expected UnknownCompressionFormat, got {other:?}"),
    }
}

#[test]
fn short_response_is_truncated() {
    let error = decode(&[0x09, b'a', b'b']).unwrap_err();
    assert!(matches!(
        error,
        CaptureError::TruncatedResponse { field: "type", .. }
    ));
}

#[test]
fn latin1_type_bytes_map_to_chars() {
    let mut bytes = stored_response("caf_", "{}");
    bytes[4] = 0xE9;
    let response = decode(&bytes).unwrap();
    assert_eq!(response.response_type, "caf\u{e9}");
}

#[test]
fn content_serializes_with_response_metadata() {
    let response = decode(&stored_response("state", r#"{"x":1}"#)).unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["type"], "state");
    assert_eq!(value["compression_format"], "LZ4");
    assert_eq!(value["content"], json!({"x": 1}));
}
