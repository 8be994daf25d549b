//! Error types for capture decoding.
//!
//! Every error carries the absolute byte range of the capture it refers to,
//! so a failure can always be traced back to the offending bytes.
//!
//! # Scopes
//!
//! - Capture scope: framing failures. Nothing past the failing frame can be
//!   decoded.
//! - Block scope: delimiter discovery and sub-record framing failures.
//! - Response scope: header, decompression and content failures.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::response::CompressionFormat;

/// Half-open range of absolute offsets into the capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range of `len` bytes starting at `start`.
    pub fn at(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}..0x{:06x}", self.start, self.end)
    }
}

/// Out-of-bounds access on a [`ByteCursor`](super::cursor::ByteCursor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("needed {wanted} byte(s) at offset 0x{offset:06x}, only {available} available")]
pub struct CursorError {
    /// Absolute offset of the attempted read
    pub offset: usize,
    pub wanted: usize,
    pub available: usize,
}

impl CursorError {
    /// Byte range covering the attempted read.
    pub fn range(&self) -> ByteRange {
        ByteRange::at(self.offset, self.wanted)
    }
}

/// How far a failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Decoding cannot continue past this point.
    Capture,
    /// Only the current block is lost.
    Block,
    /// Only the current response is lost.
    Response,
}

/// Error type for capture decoding.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Not enough bytes for a block length field or a declared payload.
    #[error("truncated frame at {range}: {source}")]
    TruncatedFrame {
        range: ByteRange,
        #[source]
        source: CursorError,
    },

    /// Length-prefixed sub-record does not fit in its block.
    #[error("truncated sub-record {range}: {source}")]
    TruncatedRecord {
        range: ByteRange,
        #[source]
        source: CursorError,
    },

    /// Heuristic marker never occurs in the block payload.
    #[error("delimiter marker 31 1a not found in block payload {range}")]
    DelimiterNotFound { range: ByteRange },

    /// A response field runs past the end of its response range.
    #[error("response {range} is too short for its {field}: {source}")]
    TruncatedResponse {
        field: &'static str,
        range: ByteRange,
        #[source]
        source: CursorError,
    },

    /// Compression tag is neither "lz4" nor "zstd".
    #[error("unknown compression format {tag:?} in response {range}")]
    UnknownCompressionFormat { tag: String, range: ByteRange },

    /// Every decompression strategy for the response failed.
    #[error("{format} decompression failed for response {range}: {reason}")]
    DecompressionFailure {
        format: CompressionFormat,
        range: ByteRange,
        reason: String,
    },

    /// Decompressed bytes are not a JSON object or null.
    #[error("response {range} content is not a JSON object: {reason}")]
    ContentParseError { range: ByteRange, reason: String },
}

impl CaptureError {
    /// Byte range the failure points at.
    pub fn range(&self) -> ByteRange {
        match self {
            CaptureError::TruncatedFrame { range, .. }
            | CaptureError::TruncatedRecord { range, .. }
            | CaptureError::DelimiterNotFound { range }
            | CaptureError::TruncatedResponse { range, .. }
            | CaptureError::UnknownCompressionFormat { range, .. }
            | CaptureError::DecompressionFailure { range, .. }
            | CaptureError::ContentParseError { range, .. } => *range,
        }
    }

    pub fn scope(&self) -> ErrorScope {
        match self {
            CaptureError::TruncatedFrame { .. } => ErrorScope::Capture,
            CaptureError::TruncatedRecord { .. } | CaptureError::DelimiterNotFound { .. } => {
                ErrorScope::Block
            }
            CaptureError::TruncatedResponse { .. }
            | CaptureError::UnknownCompressionFormat { .. }
            | CaptureError::DecompressionFailure { .. }
            | CaptureError::ContentParseError { .. } => ErrorScope::Response,
        }
    }

    /// Check if this error belongs to the frame reader.
    pub fn is_frame_error(&self) -> bool {
        self.scope() == ErrorScope::Capture
    }
}

/// A failure located inside the capture.
#[derive(Debug)]
pub struct DecodeFailure {
    pub block_index: usize,
    /// `None` when the whole block (or the framing) failed
    pub response_index: Option<usize>,
    pub error: CaptureError,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.response_index {
            Some(response) => write!(
                f,
                "block {}, response {}: {}",
                self.block_index, response, self.error
            ),
            None => write!(f, "block {}: {}", self.block_index, self.error),
        }
    }
}

impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
