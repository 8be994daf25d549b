//! Completions command handler

use std::io;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

/// Handle completions command.
///
/// Writes the completion script for `shell` to stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle<C: CommandFactory>(shell: CompletionShell) -> Result<()> {
    generate_completions::<C>(shell, &mut io::stdout())
}

pub(crate) fn generate_completions<C: CommandFactory>(
    shell: CompletionShell,
    out: &mut dyn io::Write,
) -> Result<()> {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "tzparse", out);
    Ok(())
}
