//! Capture file decoder
//!
//! A capture is a sequence of length-prefixed blocks. Each block holds one or
//! more compressed responses whose bodies decode to JSON documents.
//!
//! # Structure
//!
//! - `cursor` - Bounds-checked reads over the capture buffer
//! - `frame` - Block framing (`u16 LE` length + payload)
//! - `demux` - Splitting a block payload into response ranges
//! - `response` - Response header parsing and decompression
//! - `timestamp` - Embedded `data.ts` recovery
//! - `decode` - The whole pipeline and its result type
//! - `error` - Error types with byte ranges
//!
//! # Example
//!
//! ```no_run
//! use tzparse::capture::{Capture, DecodeOptions};
//!
//! let capture = Capture::open("session.bin", &DecodeOptions::default())?;
//! for (index, block) in capture.blocks.iter().enumerate() {
//!     println!("{}: {}", index, block);
//! }
//! println!("{}", capture.stats().summary());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cursor;
pub mod decode;
pub mod demux;
pub mod error;
pub mod frame;
pub mod response;
pub mod timestamp;

pub use cursor::ByteCursor;
pub use decode::{Block, Capture, DecodeOptions, ErrorPolicy};
pub use demux::{Delimiter, Framing, ResponseSlice};
pub use error::{ByteRange, CaptureError, CursorError, DecodeFailure, ErrorScope};
pub use frame::{FrameReader, RawBlock};
pub use response::{CompressionFormat, DecodeStrategy, Response};
