//! Writing decoded responses to disk.
//!
//! Each response becomes one JSON file named
//! `<block>_<response>_<type>.json`, so a directory listing sorts in capture
//! order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::capture::{Capture, Response};

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Fallback when a response type sanitizes to nothing.
const FALLBACK_NAME: &str = "response";

/// Longest type component kept in a filename.
const MAX_TYPE_LENGTH: usize = 64;

/// Document written for each response.
#[derive(Debug, Serialize)]
struct ExportedResponse<'a> {
    block: usize,
    #[serde(flatten)]
    response: &'a Response,
}

/// Writes responses as JSON documents into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
    pretty: bool,
    content_only: bool,
}

impl Exporter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            pretty: true,
            content_only: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write only the decoded content, without the response metadata.
    pub fn content_only(mut self, content_only: bool) -> Self {
        self.content_only = content_only;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Export every response of a capture. Returns the paths written.
    pub fn export(&self, capture: &Capture) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.directory).with_context(|| {
            format!("Failed to create export directory: {:?}", self.directory)
        })?;

        let mut written = Vec::with_capacity(capture.response_count());
        for block in &capture.blocks {
            for response in &block.responses {
                let path = self.directory.join(export_filename(
                    block.index,
                    response.index,
                    &response.response_type,
                ));
                let document = if self.content_only {
                    self.render(&response.content)?
                } else {
                    self.render(&ExportedResponse {
                        block: block.index,
                        response,
                    })?
                };
                fs::write(&path, document)
                    .with_context(|| format!("Failed to write file: {:?}", path))?;
                written.push(path);
            }
        }
        debug!(count = written.len(), directory = ?self.directory, "exported responses");
        Ok(written)
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.context("Failed to serialize response")
    }
}

/// File name for one exported response.
pub fn export_filename(block: usize, index: usize, response_type: &str) -> String {
    format!("{:04}_{:03}_{}.json", block, index, sanitize_type(response_type))
}

/// Make a response type safe to use as part of a filename.
pub fn sanitize_type(response_type: &str) -> String {
    let mut result = String::with_capacity(response_type.len());
    for c in response_type.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            result.push(c);
        } else if c.is_whitespace() || c == '_' || INVALID_CHARS.contains(&c) {
            if !result.ends_with('_') {
                result.push('_');
            }
        }
        // Control characters and non-ASCII are dropped
    }

    let trimmed: String = result
        .trim_matches(|c| c == '_' || c == '.')
        .chars()
        .take(MAX_TYPE_LENGTH)
        .collect();
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed
    }
}
