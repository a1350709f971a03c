//! Reverse direction: artifact back to a directory tree
//!
//! Documents and tabular datasets are both read into an ordered list of
//! [`CodeBlock`]s, which the reconstructor writes under an output root.
//! Blocks whose header names a class patch that class in the existing file
//! instead of rewriting the whole file.

pub mod class_patcher;
pub mod parser;
pub mod reconstructor;
pub mod tabular;

pub use class_patcher::update_class_in_file;
pub use parser::{CodeBlockParser, ParsedDocument};
pub use reconstructor::{FileTreeReconstructor, ReconstructionOutcome};
pub use tabular::TabularReader;

use crate::config::PathStyle;
use crate::walker::{BINARY_LANGUAGE, BINARY_PLACEHOLDER};
use serde::Serialize;

/// One unit read back from an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Path token as written in the artifact, before normalization
    pub path: String,
    pub language: String,
    /// Exact text between the fence delimiters
    pub content: String,
    /// Path style in effect while parsing
    pub style: PathStyle,
    /// Class to patch in place instead of writing the whole file
    pub update_class: Option<String>,
}

impl CodeBlock {
    /// Placeholder emitted for a binary or oversized file on export
    pub fn is_binary_placeholder(&self) -> bool {
        self.language == BINARY_LANGUAGE && self.content.trim() == BINARY_PLACEHOLDER
    }
}
