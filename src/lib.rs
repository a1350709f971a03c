//! # treedoc - Directory Tree to Document Serialization
//!
//! Flattens a directory tree into one portable artifact (a Markdown document
//! or a CSV dataset) carrying each file's path, summary metrics and full
//! content, and rebuilds the tree from such an artifact.
//!
//! ## Key Features
//!
//! - **Deterministic Export**: depth-first, name-ordered walk with ignore rules
//! - **Round-Trip Safe**: fences grow past any backtick run in the content
//! - **Source Metrics**: tree-sitter class/function/variable counts for 12 languages
//! - **Class Patching**: `## File: <path> (Class: <Name>)` replaces one class in place
//! - **Cancellable**: cooperative stop flag checked between files
//!
//! ## Architecture
//!
//! ```text
//!  forward:  TreeWalker ──► FileRecord[] ──► DocumentExporter | TabularExporter ──► artifact
//!
//!  reverse:  artifact ──► CodeBlockParser | TabularReader ──► CodeBlock[]
//!                                                              │
//!                                               FileTreeReconstructor ──► files
//!                                                              │
//!                                                   update_class_in_file
//! ```
//!
//! ## Modules
//!
//! - [`extractor`]: Run boundary tying the pieces together
//! - [`walker`]: Directory traversal, ignore rules and binary detection
//! - [`analysis`]: Text metrics and tree-sitter structure counts
//! - [`export`]: Markdown and CSV writers
//! - [`reverse`]: Artifact parsing, reconstruction and class patching
//! - [`config`]: TOML settings with environment variable overrides
//! - [`paths`]: Canonical and display path forms
//! - [`language`]: Extension to language tag table
//! - [`notifier`]: Progress and status channels
//! - [`types`]: Run kinds and reports
//! - [`error`]: Error types and result aliases
//!
//! ## Usage Example
//!
//! ```no_run
//! use treedoc::{ExtractionKind, Extractor, Notifier};
//!
//! fn main() -> treedoc::Result<()> {
//!     let notifier = Notifier::new().on_progress(|p| println!("{}%", p));
//!     let extractor = Extractor::new(
//!         ExtractionKind::Markdown,
//!         "./my-project",
//!         Some(std::path::Path::new("./exports")),
//!         None,
//!         notifier,
//!     )?;
//!
//!     let report = extractor.run()?;
//!     println!("wrote {:?}", report.artifact);
//!     Ok(())
//! }
//! ```

/// Text metrics and tree-sitter structural analysis
pub mod analysis;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Markdown document and CSV dataset writers
pub mod export;

/// Extractor run boundary and convenience entry points
pub mod extractor;

/// File extension to language tag mapping
pub mod language;

/// Progress and status notification
pub mod notifier;

/// Path normalization and display styles
pub mod paths;

/// Artifact parsing and file tree reconstruction
pub mod reverse;

/// Run kinds and report types
pub mod types;

/// Directory walking with ignore rules
pub mod walker;

pub use config::{PathStyle, Settings, SizeUnit};
pub use error::{Result, TreeDocError};
pub use extractor::{
    Extractor, StopHandle, csv_extraction, markdown_extraction, reverse_csv_extraction,
    reverse_markdown_extraction,
};
pub use notifier::Notifier;
pub use types::{ExtractionKind, RunReport};
