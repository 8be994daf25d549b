//! Stats command handler

use anyhow::Result;

use tzparse::cli::DecodeArgs;

use super::{decode_file, report_failures};

/// Handle the stats command.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &str, args: &DecodeArgs) -> Result<()> {
    let capture = decode_file(file, args)?;
    println!("Blocks: {}", capture.blocks.len());
    println!("{}", capture.stats().summary());
    report_failures(&capture)
}
