//! Bounds-checked cursor over an immutable byte slice.
//!
//! All framing and response parsing goes through [`ByteCursor`] instead of
//! raw index arithmetic. Every read either succeeds or returns a
//! [`CursorError`] naming the absolute offset of the failed read.

use byteorder::{ByteOrder, LittleEndian};

use super::error::CursorError;

/// Forward-only reader over a slice of the capture.
///
/// `base` is the absolute capture offset of `buf[0]`, so positions reported
/// in errors and ranges are always capture offsets.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Cursor over a whole buffer starting at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    /// Cursor over a sub-slice located at `base` in the capture.
    pub fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Position relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Absolute capture offset of the next byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn check(&self, wanted: usize) -> Result<(), CursorError> {
        let available = self.remaining();
        if wanted > available {
            return Err(CursorError {
                offset: self.offset(),
                wanted,
                available,
            });
        }
        Ok(())
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CursorError> {
        self.check(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), CursorError> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, CursorError> {
        self.check(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, CursorError> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, CursorError> {
        self.take(4).map(LittleEndian::read_u32)
    }

    /// Read a one-byte length followed by that many bytes.
    pub fn read_short_bytes(&mut self) -> Result<&'a [u8], CursorError> {
        let len = self.read_u8()? as usize;
        self.take(len)
    }

    /// Everything from the current position to the end, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }
}
