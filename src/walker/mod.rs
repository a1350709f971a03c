//! Deterministic directory traversal producing file records

pub mod binary;
pub mod filter;
pub mod record;

pub use binary::{BinaryDetector, Classified};
pub use filter::{ConfigFilter, SkipReason};
pub use record::{BINARY_LANGUAGE, BINARY_PLACEHOLDER, FileRecord};

use crate::analysis::{FileMetrics, FileMetricsAnalyzer};
use crate::config::Settings;
use crate::error::{NotFoundError, Result};
use crate::language::detect_language_for_path;
use crate::notifier::Notifier;
use crate::paths::PathFormatter;
use crate::types::{FailureEntry, SkipEntry};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Records and side results of one walk
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub records: Vec<FileRecord>,
    pub skipped: Vec<SkipEntry>,
    pub failures: Vec<FailureEntry>,
    pub cancelled: bool,
}

pub struct TreeWalker {
    pub(crate) root: PathBuf,
    settings: Arc<Settings>,
    filter: ConfigFilter,
    /// Optional cancellation flag - if set to true, walk() will exit early
    cancelled: Option<Arc<AtomicBool>>,
}

impl TreeWalker {
    pub fn new(root: impl AsRef<Path>, settings: Arc<Settings>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let filter = ConfigFilter::new(&root, &settings)?;
        Ok(Self {
            root,
            settings,
            filter,
            cancelled: None,
        })
    }

    /// Set a cancellation flag that will be checked between entries.
    pub fn with_cancellation_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    /// Leave a subtree out of the walk, whatever the settings say
    pub fn with_excluded(mut self, path: impl Into<PathBuf>) -> Self {
        self.filter = self.filter.with_excluded(path);
        self
    }

    /// Leave out earlier artifacts sitting directly in `dir`
    pub fn with_excluded_artifacts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.filter = self.filter.with_excluded_artifacts(dir);
        self
    }

    /// Check if cancellation has been requested
    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Walk the root depth-first in name order and build a record per included file
    pub fn walk(&self, notifier: &Notifier) -> Result<WalkOutcome> {
        if !self.root.exists() {
            return Err(NotFoundError::BaseDirectory(self.root.display().to_string()).into());
        }
        if !self.root.is_dir() {
            return Err(NotFoundError::NotADirectory(self.root.display().to_string()).into());
        }

        let mut outcome = WalkOutcome::default();
        let files = self.collect_files(&mut outcome);
        if outcome.cancelled {
            tracing::info!("Walk cancelled while collecting files");
            return Ok(outcome);
        }

        let total = files.len();
        tracing::info!("Found {} files under {:?}", total, self.root);

        let mut analyzer = FileMetricsAnalyzer::new();
        for (index, path) in files.iter().enumerate() {
            if self.is_cancelled() {
                tracing::info!("Walk cancelled after {} of {} files", index, total);
                outcome.cancelled = true;
                return Ok(outcome);
            }

            let canonical = PathFormatter::canonical(&self.root, path);
            notifier.status(&format!("Processing: {}", canonical));

            match self.build_record(path, canonical.clone(), &mut analyzer) {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to read {:?}: {}", path, e);
                    outcome.failures.push(FailureEntry {
                        path: canonical,
                        error: e.to_string(),
                    });
                }
            }

            notifier.progress_of(index + 1, total);
        }

        Ok(outcome)
    }

    /// Included file paths in walk order. Pruned directories and skipped
    /// files are recorded on `outcome`.
    fn collect_files(&self, outcome: &mut WalkOutcome) -> Vec<PathBuf> {
        let pruned = Arc::new(Mutex::new(Vec::new()));
        let mut builder = WalkBuilder::new(&self.root);

        builder
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if self.settings.directories.respect_gitignore {
            builder
                .git_ignore(true)
                .git_exclude(true)
                .ignore(true)
                .require_git(false);
        }

        let filter = self.filter.clone();
        let root = self.root.clone();
        let prune_log = Arc::clone(&pruned);
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                return true;
            }

            match filter.check_directory(entry.path()) {
                Some(reason) => {
                    tracing::debug!("Pruning directory {:?}: {}", entry.path(), reason);
                    if let Ok(mut pruned) = prune_log.lock() {
                        pruned.push(SkipEntry {
                            path: PathFormatter::canonical(&root, entry.path()),
                            reason: reason.to_string(),
                        });
                    }
                    false
                }
                None => true,
            }
        });

        let mut files = Vec::new();
        for entry in builder.build() {
            // Check for cancellation at the start of each iteration
            if self.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    outcome.failures.push(FailureEntry {
                        path: self.root.display().to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if let Some(reason) = self.filter.check_file(path) {
                tracing::debug!("Skipping file {:?}: {}", path, reason);
                outcome.skipped.push(SkipEntry {
                    path: PathFormatter::canonical(&self.root, path),
                    reason: reason.to_string(),
                });
                continue;
            }

            files.push(path.to_path_buf());
        }

        if let Ok(mut pruned) = pruned.lock() {
            outcome.skipped.append(&mut pruned);
        }

        files
    }

    fn build_record(
        &self,
        path: &Path,
        canonical: String,
        analyzer: &mut FileMetricsAnalyzer,
    ) -> std::io::Result<FileRecord> {
        let display_path = PathFormatter::display(&canonical, self.settings.paths.path_style);
        let language = detect_language_for_path(path);
        let size = fs::metadata(path)?.len();

        let placeholder = FileRecord {
            path: canonical,
            display_path,
            language,
            metrics: FileMetrics::opaque(size),
            content: BINARY_PLACEHOLDER.to_string(),
            is_binary: true,
        };

        if size > self.settings.metrics.max_file_size {
            tracing::debug!(
                "File {:?} exceeds max_file_size ({} > {}), exporting placeholder",
                path,
                size,
                self.settings.metrics.max_file_size
            );
            return Ok(placeholder);
        }

        match BinaryDetector::classify(fs::read(path)?) {
            Classified::Text(content) => Ok(FileRecord {
                metrics: analyzer.analyze(path, &content),
                content,
                is_binary: false,
                ..placeholder
            }),
            Classified::Binary => {
                tracing::debug!("Binary file {:?}, exporting placeholder", path);
                Ok(placeholder)
            }
        }
    }
}
