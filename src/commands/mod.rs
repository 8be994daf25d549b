//! Command handlers for the tzparse CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod completions;
pub mod config;
pub mod export;
pub mod parse;
pub mod responses;
pub mod shell;
pub mod stats;

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};

use tzparse::cli::DecodeArgs;
use tzparse::{Block, Capture, Config, Response};

/// Decode a capture file with config values overridden by CLI flags.
pub fn decode_file(file: &str, args: &DecodeArgs) -> Result<Capture> {
    let config = Config::load()?;
    let options = args.apply(config.decode.options());
    Capture::open(Path::new(file), &options)
}

/// Write the block listing printed by `parse`.
pub fn write_blocks<W: Write>(out: &mut W, capture: &Capture, indent: &str) -> Result<()> {
    writeln!(out, "{}File parsed successfully.", indent)?;
    writeln!(out, "{}Block count: {}", indent, capture.blocks.len())?;
    for block in &capture.blocks {
        writeln!(out, "{}{}", indent, block_line(block))?;
    }
    Ok(())
}

/// One line of the block listing.
pub fn block_line(block: &Block) -> String {
    format!("{}: {}", block.index, block)
}

/// One line of the response listing, labelled `<block>.<response>`.
pub fn response_line(block: &Block, response: &Response) -> String {
    format!("{}.{}: {}", block.index, response.index, response)
}

/// Print best-effort failures to stderr and fail if there were any.
pub fn report_failures(capture: &Capture) -> Result<()> {
    if capture.is_complete() {
        return Ok(());
    }
    eprintln!();
    eprintln!("{} failure(s):", capture.failures.len());
    for failure in &capture.failures {
        eprintln!("  {}", failure);
    }
    bail!(
        "{} part(s) of the capture could not be decoded",
        capture.failures.len()
    )
}
