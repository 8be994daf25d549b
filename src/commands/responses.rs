//! Responses command handler

use anyhow::{bail, Result};

use tzparse::cli::DecodeArgs;

use super::{decode_file, report_failures, response_line};

/// Handle the responses command.
///
/// Lists every response, or those of one block when `block` is given.
/// With `json`, prints each response's content as one JSON line instead.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &str, block: Option<usize>, json: bool, args: &DecodeArgs) -> Result<()> {
    let capture = decode_file(file, args)?;

    if let Some(index) = block {
        if index >= capture.blocks.len() {
            bail!(
                "Block {} does not exist (capture has {} blocks)",
                index,
                capture.blocks.len()
            );
        }
    }

    let selected = capture
        .blocks
        .iter()
        .filter(|b| block.map_or(true, |index| b.index == index));
    for b in selected {
        for response in &b.responses {
            if json {
                println!("{}", serde_json::to_string(&response.content)?);
            } else {
                println!("{}", response_line(b, response));
            }
        }
    }

    report_failures(&capture)
}
