//! tzparse library
//!
//! Decodes binary session capture files into typed, decompressed JSON
//! responses with optional embedded timestamps.

pub mod capture;
pub mod cli;
pub mod config;
pub mod export;
pub mod stats;

pub use capture::{Block, Capture, CaptureError, DecodeOptions, ErrorPolicy, Framing, Response};
pub use config::Config;
pub use export::Exporter;
pub use stats::SessionStats;
