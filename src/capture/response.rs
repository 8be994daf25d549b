//! Response decoding.
//!
//! A response range has this layout:
//!
//! ```text
//! [type len: u8][type][sep: u8][tag len: u8][tag: "lz4" | "zstd"][body ...]
//! ```
//!
//! The body layout depends on the compression tag and is not
//! self-describing. Offsets below are counted from the first byte after the
//! tag text:
//!
//! - zstd: the frame starts at +2 or +3. +2 is tried first.
//! - lz4: the byte at +1 is a lookahead. `0x59` means the body is stored
//!   uncompressed and the literal text starts at +10. Otherwise
//!   `decompressed_len: u32 LE` sits at +3, `compressed_len: u32 LE` at +7,
//!   and the raw LZ4 block starts at +11.
//!
//! Each of these is kept as a named [`DecodeStrategy`] so the decoded
//! response records which path produced it.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::cursor::ByteCursor;
use super::demux::ResponseSlice;
use super::error::{ByteRange, CaptureError, CursorError};
use super::timestamp::extract_timestamp;

/// Separator byte following the type string.
pub const FIELD_SEPARATOR_LEN: usize = 1;

/// Candidate zstd frame offsets after the compression tag, in try order.
pub const ZSTD_STREAM_OFFSETS: [usize; 2] = [2, 3];

/// Lookahead byte marking an lz4-tagged body stored uncompressed.
pub const LZ4_STORED_SENTINEL: u8 = 0x59;

/// Offset of the lz4 lookahead byte after the compression tag.
pub const LZ4_LOOKAHEAD_OFFSET: usize = 1;

/// Header skipped (from the lookahead byte) before stored literal text.
pub const LZ4_STORED_HEADER_LEN: usize = 9;

/// Bytes skipped (from the lookahead byte) before the lz4 size header.
pub const LZ4_SIZE_HEADER_SKIP: usize = 2;

/// Upper bound on the LZ4 expansion ratio, used to reject absurd size headers.
const LZ4_MAX_RATIO: usize = 255;

/// Compression codec named by a response's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompressionFormat {
    #[serde(rename = "LZ4")]
    Lz4,
    #[serde(rename = "ZSTD")]
    Zstd,
}

impl CompressionFormat {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "lz4" => Some(CompressionFormat::Lz4),
            "zstd" => Some(CompressionFormat::Zstd),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> &'static str {
        match self {
            CompressionFormat::Lz4 => "lz4",
            CompressionFormat::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionFormat::Lz4 => write!(f, "LZ4"),
            CompressionFormat::Zstd => write!(f, "ZSTD"),
        }
    }
}

/// Body layout that successfully decoded a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// zstd frame found this many bytes after the tag
    Zstd { offset: usize },
    /// lz4-tagged body stored as literal text (sentinel lookahead)
    Lz4Stored,
    /// Raw LZ4 block with explicit size header
    Lz4Block {
        decompressed_len: u32,
        compressed_len: u32,
    },
}

/// One decoded response.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Position of the response in its block, counting undecodable ones
    pub index: usize,
    /// Type string identifying the response
    #[serde(rename = "type")]
    pub response_type: String,
    pub compression_format: CompressionFormat,
    pub strategy: DecodeStrategy,
    /// Bytes the response occupies in the capture
    pub compressed_size: usize,
    /// Length of the decompressed body
    pub decompressed_size: usize,
    /// Decoded JSON document (object or null)
    pub content: Value,
    /// Embedded `data.ts`, in local time
    pub timestamp: Option<DateTime<Local>>,
    /// Absolute range of the response in the capture
    pub range: ByteRange,
}

impl Response {
    /// Decode one response range.
    pub fn decode(slice: &ResponseSlice<'_>) -> Result<Self, CaptureError> {
        let range = slice.range();
        let truncated = |field: &'static str| {
            move |source: CursorError| CaptureError::TruncatedResponse {
                field,
                range,
                source,
            }
        };

        let mut cursor = slice.cursor();
        let response_type = latin1(cursor.read_short_bytes().map_err(truncated("type"))?);
        cursor
            .skip(FIELD_SEPARATOR_LEN)
            .map_err(truncated("type separator"))?;
        let tag = latin1(
            cursor
                .read_short_bytes()
                .map_err(truncated("compression tag"))?,
        );
        let compression_format = CompressionFormat::from_tag(&tag)
            .ok_or_else(|| CaptureError::UnknownCompressionFormat { tag, range })?;

        let (strategy, body) = match compression_format {
            CompressionFormat::Zstd => decompress_zstd(&cursor, range)?,
            CompressionFormat::Lz4 => decompress_lz4(&cursor, range)?,
        };
        trace!(
            offset = range.start,
            response_type = %response_type,
            ?strategy,
            size = body.len(),
            "decompressed response"
        );

        let content = parse_content(&body, range)?;
        let timestamp = extract_timestamp(&content);

        Ok(Response {
            index: slice.index,
            response_type,
            compression_format,
            strategy,
            compressed_size: range.len(),
            decompressed_size: body.len(),
            content,
            timestamp,
            range,
        })
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp {
            Some(time) => write!(
                f,
                "Type: {}, Time: {}, Compression: {}, Size: {}",
                self.response_type,
                time.format("%Y-%m-%d %H:%M:%S"),
                self.compression_format,
                self.compressed_size
            ),
            None => write!(
                f,
                "Type: {}, Compression: {}, Size: {}",
                self.response_type, self.compression_format, self.compressed_size
            ),
        }
    }
}

/// Bytes mapped one-to-one onto chars.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Try each zstd offset in turn.
fn decompress_zstd(
    after_tag: &ByteCursor<'_>,
    range: ByteRange,
) -> Result<(DecodeStrategy, Vec<u8>), CaptureError> {
    let mut reasons = Vec::with_capacity(ZSTD_STREAM_OFFSETS.len());

    for offset in ZSTD_STREAM_OFFSETS {
        let mut body = after_tag.clone();
        if let Err(err) = body.skip(offset) {
            reasons.push(format!("+{}: {}", offset, err));
            continue;
        }
        match zstd::stream::decode_all(body.rest()) {
            Ok(bytes) => return Ok((DecodeStrategy::Zstd { offset }, bytes)),
            Err(err) => {
                debug!(offset = range.start, attempt = offset, error = %err, "zstd attempt failed");
                reasons.push(format!("+{}: {}", offset, err));
            }
        }
    }

    Err(CaptureError::DecompressionFailure {
        format: CompressionFormat::Zstd,
        range,
        reason: reasons.join("; "),
    })
}

/// Stored-literal or raw-block lz4 body.
fn decompress_lz4(
    after_tag: &ByteCursor<'_>,
    range: ByteRange,
) -> Result<(DecodeStrategy, Vec<u8>), CaptureError> {
    let failure = |reason: String| CaptureError::DecompressionFailure {
        format: CompressionFormat::Lz4,
        range,
        reason,
    };
    let truncated = |field: &'static str| {
        move |source: CursorError| CaptureError::TruncatedResponse {
            field,
            range,
            source,
        }
    };

    let mut body = after_tag.clone();
    body.skip(LZ4_LOOKAHEAD_OFFSET)
        .map_err(truncated("lz4 lookahead"))?;
    let lookahead = body.peek_u8().map_err(truncated("lz4 lookahead"))?;

    if lookahead == LZ4_STORED_SENTINEL {
        body.skip(LZ4_STORED_HEADER_LEN)
            .map_err(truncated("stored lz4 header"))?;
        return Ok((DecodeStrategy::Lz4Stored, body.rest().to_vec()));
    }

    body.skip(LZ4_SIZE_HEADER_SKIP)
        .map_err(truncated("lz4 size header"))?;
    let decompressed_len = body.read_u32_le().map_err(truncated("lz4 size header"))?;
    let compressed_len = body.read_u32_le().map_err(truncated("lz4 size header"))?;

    let available = body.remaining();
    if compressed_len as usize > available {
        return Err(failure(format!(
            "compressed length {} exceeds the {} byte(s) left in the response",
            compressed_len, available
        )));
    }
    if decompressed_len as usize > (compressed_len as usize).saturating_mul(LZ4_MAX_RATIO) {
        return Err(failure(format!(
            "decompressed length {} is impossible for {} compressed byte(s)",
            decompressed_len, compressed_len
        )));
    }

    let input = body
        .take(compressed_len as usize)
        .map_err(truncated("lz4 block"))?;
    if !body.is_at_end() {
        debug!(
            offset = range.start,
            trailing = body.remaining(),
            "ignoring bytes after lz4 block"
        );
    }

    let mut output = vec![0u8; decompressed_len as usize];
    let written = lz4_flex::block::decompress_into(input, &mut output)
        .map_err(|err| failure(err.to_string()))?;
    if written != output.len() {
        return Err(failure(format!(
            "block produced {} byte(s), header declared {}",
            written, decompressed_len
        )));
    }

    Ok((
        DecodeStrategy::Lz4Block {
            decompressed_len,
            compressed_len,
        },
        output,
    ))
}

/// Parse decompressed bytes as a JSON object or null.
fn parse_content(bytes: &[u8], range: ByteRange) -> Result<Value, CaptureError> {
    let text = String::from_utf8_lossy(bytes);
    let value: Value =
        serde_json::from_str(&text).map_err(|err| CaptureError::ContentParseError {
            range,
            reason: err.to_string(),
        })?;

    match value {
        Value::Object(_) | Value::Null => Ok(value),
        other => Err(CaptureError::ContentParseError {
            range,
            reason: format!("expected an object or null, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
