//! In-memory record of one walked file

use crate::analysis::FileMetrics;
use crate::config::SizeUnit;
use serde::Serialize;

/// Content stand-in for binary and oversized files
pub const BINARY_PLACEHOLDER: &str = "<binary file omitted>";

/// Fence language used for placeholder blocks
pub const BINARY_LANGUAGE: &str = "binary";

/// One walked file, built once and only read afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// Canonical root-relative path (`src/app.py`)
    pub path: String,
    /// Path rendered in the configured style
    pub display_path: String,
    pub language: &'static str,
    pub metrics: FileMetrics,
    /// Full text, or [`BINARY_PLACEHOLDER`]
    pub content: String,
    pub is_binary: bool,
}

impl FileRecord {
    /// Language tag for the record's fenced block
    pub fn fence_language(&self) -> &'static str {
        if self.is_binary {
            BINARY_LANGUAGE
        } else {
            self.language
        }
    }

    pub fn metrics_string(&self, unit: SizeUnit) -> String {
        self.metrics.render(unit)
    }
}
