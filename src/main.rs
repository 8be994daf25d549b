//! tzparse - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tzparse::cli::{Cli, Commands, ConfigCommands};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TZPARSE_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { file, decode } => commands::parse::handle(&file, &decode),
        Commands::Responses {
            file,
            block,
            json,
            decode,
        } => commands::responses::handle(&file, block, json, &decode),
        Commands::Stats { file, decode } => commands::stats::handle(&file, &decode),
        Commands::Export {
            file,
            out,
            compact,
            content_only,
            decode,
        } => commands::export::handle(&file, out.as_deref(), compact, content_only, &decode),
        Commands::Shell => commands::shell::handle(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Init { force } => commands::config::handle_init(force),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}
