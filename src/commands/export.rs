//! Export command handler

use std::path::PathBuf;

use anyhow::Result;

use tzparse::cli::DecodeArgs;
use tzparse::{Config, Exporter};

use super::report_failures;

/// Handle the export command.
///
/// Writes one JSON file per response into `out`, or the configured export
/// directory when `out` is not given.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    file: &str,
    out: Option<&str>,
    compact: bool,
    content_only: bool,
    args: &DecodeArgs,
) -> Result<()> {
    let config = Config::load()?;
    let options = args.apply(config.decode.options());
    let capture = tzparse::Capture::open(file, &options)?;

    let directory = out
        .map(PathBuf::from)
        .unwrap_or_else(|| config.export_directory());
    let exporter = Exporter::new(directory)
        .pretty(config.export.pretty && !compact)
        .content_only(content_only);
    let written = exporter.export(&capture)?;

    println!(
        "Exported {} response(s) to {}",
        written.len(),
        exporter.directory().display()
    );
    report_failures(&capture)
}
