//! Parse command handler

use std::io;

use anyhow::Result;

use tzparse::cli::DecodeArgs;

use super::{decode_file, report_failures, write_blocks};

/// Handle the parse command.
///
/// Decodes the capture and lists its blocks.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &str, args: &DecodeArgs) -> Result<()> {
    let capture = decode_file(file, args)?;
    write_blocks(&mut io::stdout().lock(), &capture, "")?;
    report_failures(&capture)
}
