//! CLI definitions for tzparse
//!
//! This module contains the clap CLI structure definitions, separated from
//! main.rs so the command tree can be inspected from tests.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use crate::capture::{DecodeOptions, ErrorPolicy, Framing};

/// Build clap styles.
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "tzparse")]
#[command(about = "Decode binary session capture files into typed JSON responses")]
#[command(
    long_about = "tzparse - Decode binary session capture files.

A capture is a sequence of length-prefixed blocks, each holding one or more
LZ4 or ZSTD compressed responses. tzparse splits the blocks, decompresses every
response and parses its JSON content.

QUICK START:
    tzparse parse capture.bin         List blocks
    tzparse responses capture.bin     List every response
    tzparse stats capture.bin         Per-type counts and session duration
    tzparse export capture.bin        Write one JSON file per response

LOGGING:
    Set TZPARSE_LOG (e.g. TZPARSE_LOG=debug) or pass --verbose."
)]
#[command(version, styles = build_cli_styles())]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that decodes a capture.
#[derive(Args, Debug, Clone, Default)]
pub struct DecodeArgs {
    /// Response framing inside blocks (delimited, length-prefixed)
    #[arg(long, value_parser = parse_framing)]
    pub framing: Option<Framing>,
    /// Keep decoding after failures and report them at the end
    #[arg(long)]
    pub best_effort: bool,
    /// Decode on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl DecodeArgs {
    /// Apply the flags on top of configured options.
    pub fn apply(&self, mut options: DecodeOptions) -> DecodeOptions {
        if let Some(framing) = self.framing {
            options.framing = framing;
        }
        if self.best_effort {
            options.policy = ErrorPolicy::BestEffort;
        }
        if self.sequential {
            options.parallel = false;
        }
        options
    }
}

fn parse_framing(value: &str) -> Result<Framing, String> {
    Framing::from_name(value).ok_or_else(|| {
        format!(
            "unknown framing '{}' (expected delimited or length-prefixed)",
            value
        )
    })
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a capture and list its blocks
    #[command(long_about = "Decode a capture file and list its blocks.

Prints the block count followed by one line per block with its declared
size and the number of responses it holds.

EXAMPLES:
    tzparse parse capture.bin
    tzparse parse capture.bin --framing length-prefixed
    tzparse parse capture.bin --best-effort")]
    Parse {
        /// Path to the capture file
        file: String,
        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List decoded responses
    #[command(
        visible_alias = "ls",
        long_about = "List decoded responses with type, timestamp, compression and size.

EXAMPLES:
    tzparse responses capture.bin             All responses
    tzparse responses capture.bin --block 3   Responses of block 3 only
    tzparse responses capture.bin --json      Print decoded content as JSON lines"
    )]
    Responses {
        /// Path to the capture file
        file: String,
        /// Only list responses of this block
        #[arg(long, short)]
        block: Option<usize>,
        /// Print each response's content as a JSON line
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Show per-type counts and session duration
    Stats {
        /// Path to the capture file
        file: String,
        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Write one JSON file per response
    #[command(long_about = "Write every decoded response to its own JSON file.

Files are named <block>_<response>_<type>.json. The output directory
defaults to [export].directory from the config file.

EXAMPLES:
    tzparse export capture.bin
    tzparse export capture.bin --out dumps/ --compact
    tzparse export capture.bin --content-only")]
    Export {
        /// Path to the capture file
        file: String,
        /// Output directory (overrides config)
        #[arg(long, short)]
        out: Option<String>,
        /// Write compact instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,
        /// Write only the decoded content, without metadata
        #[arg(long)]
        content_only: bool,
        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Interactive shell (parse, blocks, responses, stats)
    Shell,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
