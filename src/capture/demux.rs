//! Splitting a block payload into response byte ranges.
//!
//! Two framings are supported.
//!
//! # Delimited
//!
//! Responses are separated by an 11-byte delimiter that is not declared
//! anywhere. It is discovered per block in two phases:
//!
//! 1. Locate the first `31 1A` marker at or after payload offset 11. The 11
//!    bytes right before the marker are the delimiter; they close the block
//!    header and the first response starts at the marker.
//! 2. Scan forward from the marker for non-overlapping copies of the
//!    delimiter. Each copy ends the current response; the last response runs
//!    to the end of the payload.
//!
//! ```text
//! [header ...][delimiter][31 1A response 0][delimiter][response 1] ... [response n]
//! ```
//!
//! A delimiter sequence that happens to occur inside a compressed body
//! splits that response. The delimiter is content-derived, so this cannot be
//! ruled out.
//!
//! # Length-prefixed
//!
//! The payload is a sequence of `[u16 LE len][len bytes]` sub-records, one
//! per response. No discovery is needed.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::cursor::ByteCursor;
use super::error::{ByteRange, CaptureError};
use super::frame::RawBlock;

/// Two-byte marker located right after the first delimiter.
pub const DELIMITER_MARKER: [u8; 2] = [0x31, 0x1A];

/// Length of the per-block response delimiter.
pub const DELIMITER_LEN: usize = 11;

/// Payload offset where the marker scan starts.
pub const MARKER_SCAN_START: usize = DELIMITER_LEN;

/// Size of the `u16 LE` length in front of each length-prefixed record.
pub const RECORD_LENGTH_LEN: usize = 2;

/// How responses are laid out inside a block payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// Responses separated by a discovered 11-byte delimiter
    #[default]
    Delimited,
    /// Responses stored as `[u16 LE len][bytes]` sub-records
    LengthPrefixed,
}

impl Framing {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "delimited" => Some(Framing::Delimited),
            "length-prefixed" => Some(Framing::LengthPrefixed),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Framing::Delimited => "delimited",
            Framing::LengthPrefixed => "length-prefixed",
        }
    }
}

/// The delimiter discovered for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub bytes: [u8; DELIMITER_LEN],
    /// Payload offset of the marker, i.e. where the first response starts
    pub marker_offset: usize,
}

impl Delimiter {
    /// Length of the block header preceding the first response.
    pub fn header_len(&self) -> usize {
        self.marker_offset
    }
}

/// Byte range of one undecoded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSlice<'a> {
    pub index: usize,
    /// Absolute offset of the first byte
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> ResponseSlice<'a> {
    pub fn range(&self) -> ByteRange {
        ByteRange::at(self.offset, self.bytes.len())
    }

    pub fn cursor(&self) -> ByteCursor<'a> {
        ByteCursor::with_base(self.bytes, self.offset)
    }
}

/// Phase one: find the marker and read the delimiter before it.
pub fn discover_delimiter(payload: &[u8]) -> Option<Delimiter> {
    if payload.len() < MARKER_SCAN_START + DELIMITER_MARKER.len() {
        return None;
    }
    let marker_offset = payload[MARKER_SCAN_START..]
        .windows(DELIMITER_MARKER.len())
        .position(|window| window == DELIMITER_MARKER)?
        + MARKER_SCAN_START;

    let mut bytes = [0u8; DELIMITER_LEN];
    bytes.copy_from_slice(&payload[marker_offset - DELIMITER_LEN..marker_offset]);
    Some(Delimiter {
        bytes,
        marker_offset,
    })
}

/// Phase two: payload-relative `(start, end)` of every response.
pub fn split_on_delimiter(payload: &[u8], delimiter: &Delimiter) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = delimiter.marker_offset;
    let mut pos = start;

    while pos + DELIMITER_LEN <= payload.len() {
        if payload[pos..pos + DELIMITER_LEN] == delimiter.bytes {
            ranges.push((start, pos));
            pos += DELIMITER_LEN;
            start = pos;
        } else {
            pos += 1;
        }
    }
    ranges.push((start, payload.len()));
    ranges
}

/// Split a block using the delimiter heuristic.
pub fn split_delimited<'a>(block: &RawBlock<'a>) -> Result<Vec<ResponseSlice<'a>>, CaptureError> {
    let delimiter =
        discover_delimiter(block.payload).ok_or_else(|| CaptureError::DelimiterNotFound {
            range: block.payload_range(),
        })?;
    trace!(
        block = block.index,
        marker_offset = delimiter.marker_offset,
        delimiter = ?delimiter.bytes,
        "discovered delimiter"
    );

    let base = block.payload_offset();
    let slices: Vec<_> = split_on_delimiter(block.payload, &delimiter)
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| ResponseSlice {
            index,
            offset: base + start,
            bytes: &block.payload[start..end],
        })
        .collect();
    debug!(block = block.index, responses = slices.len(), "split delimited block");
    Ok(slices)
}

/// Split a block made of length-prefixed sub-records.
pub fn split_length_prefixed<'a>(
    block: &RawBlock<'a>,
) -> Result<Vec<ResponseSlice<'a>>, CaptureError> {
    let mut cursor = block.cursor();
    let mut slices = Vec::new();

    while !cursor.is_at_end() {
        let record_start = cursor.offset();
        let len = cursor
            .read_u16_le()
            .map_err(|source| CaptureError::TruncatedRecord {
                range: ByteRange::new(record_start, block.payload_range().end),
                source,
            })? as usize;
        let offset = cursor.offset();
        let bytes = cursor
            .take(len)
            .map_err(|source| CaptureError::TruncatedRecord {
                range: ByteRange::at(record_start, RECORD_LENGTH_LEN + len),
                source,
            })?;
        slices.push(ResponseSlice {
            index: slices.len(),
            offset,
            bytes,
        });
    }
    debug!(block = block.index, responses = slices.len(), "split length-prefixed block");
    Ok(slices)
}

/// Split a block with the given framing.
pub fn split_block<'a>(
    block: &RawBlock<'a>,
    framing: Framing,
) -> Result<Vec<ResponseSlice<'a>>, CaptureError> {
    match framing {
        Framing::Delimited => split_delimited(block),
        Framing::LengthPrefixed => split_length_prefixed(block),
    }
}
