//! Length-prefixed block framing.
//!
//! A capture is a flat concatenation of frames:
//!
//! ```text
//! [len: u16 LE][payload: len bytes][len: u16 LE][payload] ...
//! ```
//!
//! [`FrameReader`] walks the buffer and yields one [`RawBlock`] per frame.
//! Iteration ends when the cursor lands exactly on the end of the buffer.

use tracing::trace;

use super::cursor::ByteCursor;
use super::error::{ByteRange, CaptureError};

/// Size of the block length field.
pub const LENGTH_FIELD_LEN: usize = 2;

/// One framed block, still undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// Position of the block in the capture
    pub index: usize,
    /// Absolute offset of the length field
    pub offset: usize,
    /// Declared payload length
    pub length: u16,
    pub payload: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Absolute offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + LENGTH_FIELD_LEN
    }

    /// Absolute range of the payload.
    pub fn payload_range(&self) -> ByteRange {
        ByteRange::at(self.payload_offset(), self.payload.len())
    }

    /// Bytes this frame occupies in the capture (length field included).
    pub fn frame_len(&self) -> usize {
        LENGTH_FIELD_LEN + self.payload.len()
    }

    /// Cursor over the payload with capture-absolute offsets.
    pub fn cursor(&self) -> ByteCursor<'a> {
        ByteCursor::with_base(self.payload, self.payload_offset())
    }
}

/// Iterator over the frames of a capture.
///
/// Yields `Err` at most once; after a framing error the iterator is fused.
#[derive(Debug)]
pub struct FrameReader<'a> {
    cursor: ByteCursor<'a>,
    index: usize,
    failed: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(capture: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(capture),
            index: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor.position()
    }

    /// Read the frame at the cursor.
    pub fn read_block(&mut self) -> Result<RawBlock<'a>, CaptureError> {
        let offset = self.cursor.position();

        // Work on a copy so a truncated payload leaves the cursor on the
        // length field it failed at.
        let mut cursor = self.cursor.clone();
        let length = cursor
            .read_u16_le()
            .map_err(|source| CaptureError::TruncatedFrame {
                range: ByteRange::new(offset, self.cursor.len()),
                source,
            })?;
        let payload = cursor
            .take(length as usize)
            .map_err(|source| CaptureError::TruncatedFrame {
                range: ByteRange::at(offset, LENGTH_FIELD_LEN + length as usize),
                source,
            })?;

        self.cursor = cursor;
        let block = RawBlock {
            index: self.index,
            offset,
            length,
            payload,
        };
        self.index += 1;
        trace!(index = block.index, offset, length, "framed block");
        Ok(block)
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<RawBlock<'a>, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let result = self.read_block();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
