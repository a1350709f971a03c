use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction and format of an extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    /// Directory tree to a markdown document
    Markdown,
    /// Directory tree to a three-column CSV dataset
    Csv,
    /// Markdown document back to a directory tree
    ReverseMarkdown,
    /// CSV dataset back to a directory tree
    ReverseCsv,
}

impl ExtractionKind {
    /// Whether this run reads an artifact and writes files
    pub fn is_reverse(&self) -> bool {
        matches!(self, ExtractionKind::ReverseMarkdown | ExtractionKind::ReverseCsv)
    }

    /// Artifact file extension for forward runs
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            ExtractionKind::Markdown | ExtractionKind::ReverseMarkdown => "md",
            ExtractionKind::Csv | ExtractionKind::ReverseCsv => "csv",
        }
    }
}

impl fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionKind::Markdown => "markdown",
            ExtractionKind::Csv => "csv",
            ExtractionKind::ReverseMarkdown => "reverse_markdown",
            ExtractionKind::ReverseCsv => "reverse_csv",
        };
        f.write_str(name)
    }
}

/// A file or block that was deliberately left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipEntry {
    /// Canonical or header path of the skipped item
    pub path: String,
    pub reason: String,
}

/// A per-file failure that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub path: String,
    pub error: String,
}

/// Outcome of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub kind: ExtractionKind,
    /// Artifact written by a forward run
    #[serde(default)]
    pub artifact: Option<String>,
    /// Records exported, or blocks parsed for a reverse run
    pub records: usize,
    /// Files written whole
    #[serde(default)]
    pub written: usize,
    /// Classes patched in place
    #[serde(default)]
    pub patched: usize,
    #[serde(default)]
    pub skipped: Vec<SkipEntry>,
    #[serde(default)]
    pub failures: Vec<FailureEntry>,
    /// Non-fatal parse warnings, rendered
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Run stopped early through `stop()`
    #[serde(default)]
    pub cancelled: bool,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new(kind: ExtractionKind) -> Self {
        Self {
            kind,
            artifact: None,
            records: 0,
            written: 0,
            patched: 0,
            skipped: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            cancelled: false,
            duration_ms: 0,
        }
    }

    /// Report for a run stopped before it touched the filesystem
    pub fn cancelled(kind: ExtractionKind) -> Self {
        Self {
            cancelled: true,
            ..Self::new(kind)
        }
    }

    /// True when the run finished without per-file failures
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }
}
