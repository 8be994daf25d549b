//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::capture::{DecodeOptions, ErrorPolicy, Framing};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Capture decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// How responses are laid out inside a block
    #[serde(default)]
    pub framing: Framing,
    /// Abort on the first failure, or keep going and report
    #[serde(default)]
    pub policy: ErrorPolicy,
    /// Decode blocks on all cores
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

pub fn default_parallel() -> bool {
    true
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            policy: ErrorPolicy::default(),
            parallel: default_parallel(),
        }
    }
}

impl DecodeConfig {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            framing: self.framing,
            policy: self.policy,
            parallel: self.parallel,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory that receives one JSON file per response
    #[serde(default = "default_export_directory")]
    pub directory: String,
    /// Pretty-print exported JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

pub fn default_export_directory() -> String {
    "./tzparse-export".to_string()
}

pub fn default_pretty() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            pretty: default_pretty(),
        }
    }
}
