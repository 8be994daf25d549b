//! Whole-capture decoding.
//!
//! [`Capture::decode`] runs the pipeline end to end:
//!
//! 1. [`FrameReader`] slices the buffer into blocks.
//! 2. Each block is split into response ranges with the configured
//!    [`Framing`].
//! 3. Each range is decoded into a [`Response`].
//!
//! Blocks and responses are independent of each other, so steps 2 and 3 run
//! on the rayon pool when `parallel` is set. `collect` keeps file order, which
//! the session duration depends on.
//!
//! # Error policy
//!
//! - [`ErrorPolicy::Strict`]: the first failure in file order aborts the
//!   decode and is returned as the error.
//! - [`ErrorPolicy::BestEffort`]: failures are collected next to the decoded
//!   data. A block whose delimiter cannot be found is kept with no responses,
//!   a failed response is dropped, and a framing error ends the block list.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::demux::{split_block, Framing, ResponseSlice};
use super::error::{CaptureError, DecodeFailure};
use super::frame::{FrameReader, RawBlock};
use super::response::Response;
use crate::stats::SessionStats;

/// What to do when part of a capture fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Abort on the first failure
    #[default]
    Strict,
    /// Keep going and report failures alongside the results
    BestEffort,
}

/// Options for [`Capture::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub framing: Framing,
    pub policy: ErrorPolicy,
    /// Decode blocks and responses on the rayon thread pool
    pub parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            policy: ErrorPolicy::default(),
            parallel: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// A decoded block.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub index: usize,
    /// Absolute offset of the block's length field
    pub offset: usize,
    /// Declared payload length
    pub length: u16,
    pub responses: Vec<Response>,
}

impl Block {
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block Size: {}, Response Count: {}",
            self.length,
            self.response_count()
        )
    }
}

/// Result of decoding a whole capture.
#[derive(Debug)]
pub struct Capture {
    pub blocks: Vec<Block>,
    /// Failures collected in best-effort mode, in file order
    pub failures: Vec<DecodeFailure>,
    /// Bytes consumed by the frame reader
    pub consumed: usize,
}

impl Capture {
    /// Decode a capture buffer.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first failure in file order with the
    /// block and response it belongs to. Best-effort mode only returns `Ok`.
    pub fn decode(capture: &[u8], options: &DecodeOptions) -> Result<Self, DecodeFailure> {
        let mut reader = FrameReader::new(capture);
        let mut raw_blocks = Vec::new();
        let mut frame_failure = None;

        for result in reader.by_ref() {
            match result {
                Ok(block) => raw_blocks.push(block),
                Err(error) => {
                    frame_failure = Some(DecodeFailure {
                        block_index: raw_blocks.len(),
                        response_index: None,
                        error,
                    });
                }
            }
        }
        let consumed = reader.consumed();

        let outcomes: Vec<BlockOutcome> = if options.parallel {
            raw_blocks
                .par_iter()
                .map(|raw| decode_block(raw, options))
                .collect()
        } else {
            raw_blocks
                .iter()
                .map(|raw| decode_block(raw, options))
                .collect()
        };

        let mut blocks = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            blocks.push(outcome.block);
            failures.extend(outcome.failures);
        }
        failures.extend(frame_failure);

        if options.policy == ErrorPolicy::Strict {
            if let Some(first) = failures.into_iter().next() {
                return Err(first);
            }
            failures = Vec::new();
        }

        for failure in &failures {
            warn!(%failure, "skipped undecodable data");
        }
        let capture = Capture {
            blocks,
            failures,
            consumed,
        };
        debug!(
            blocks = capture.blocks.len(),
            responses = capture.response_count(),
            failures = capture.failures.len(),
            consumed,
            "decoded capture"
        );
        Ok(capture)
    }

    /// Read a capture file and decode it.
    pub fn open<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        Self::decode(&bytes, options)
            .with_context(|| format!("Failed to decode capture: {:?}", path))
    }

    /// All responses across all blocks, in file order.
    pub fn responses(&self) -> impl Iterator<Item = &Response> + '_ {
        self.blocks.iter().flat_map(|block| block.responses.iter())
    }

    pub fn response_count(&self) -> usize {
        self.blocks.iter().map(Block::response_count).sum()
    }

    /// Check if every block and response decoded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Per-type counts and session duration.
    pub fn stats(&self) -> SessionStats {
        SessionStats::from_responses(self.responses())
    }
}

/// Decoded block plus whatever failed inside it.
struct BlockOutcome {
    block: Block,
    failures: Vec<DecodeFailure>,
}

fn decode_block(raw: &RawBlock<'_>, options: &DecodeOptions) -> BlockOutcome {
    let mut block = Block {
        index: raw.index,
        offset: raw.offset,
        length: raw.length,
        responses: Vec::new(),
    };

    let slices = match split_block(raw, options.framing) {
        Ok(slices) => slices,
        Err(error) => {
            return BlockOutcome {
                block,
                failures: vec![DecodeFailure {
                    block_index: raw.index,
                    response_index: None,
                    error,
                }],
            }
        }
    };

    let results: Vec<(usize, Result<Response, CaptureError>)> = if options.parallel {
        slices.par_iter().map(decode_slice).collect()
    } else {
        slices.iter().map(decode_slice).collect()
    };

    let mut failures = Vec::new();
    for (index, result) in results {
        match result {
            Ok(response) => block.responses.push(response),
            Err(error) => failures.push(DecodeFailure {
                block_index: raw.index,
                response_index: Some(index),
                error,
            }),
        }
    }
    BlockOutcome { block, failures }
}

fn decode_slice(slice: &ResponseSlice<'_>) -> (usize, Result<Response, CaptureError>) {
    (slice.index, Response::decode(slice))
}
