use super::CodeBlock;
use super::class_patcher::update_class_in_file;
use crate::error::WriteError;
use crate::notifier::Notifier;
use crate::paths::PathFormatter;
use crate::types::{FailureEntry, SkipEntry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of writing a block list to disk
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconstructionOutcome {
    pub written: usize,
    pub patched: usize,
    pub skipped: Vec<SkipEntry>,
    pub failures: Vec<FailureEntry>,
    pub cancelled: bool,
}

enum Applied {
    Written,
    Patched,
    ClassNotFound(String),
}

/// Writes code blocks under an output root, in order
pub struct FileTreeReconstructor {
    root: PathBuf,
    cancelled: Option<Arc<AtomicBool>>,
}

impl FileTreeReconstructor {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cancelled: None,
        }
    }

    pub fn with_cancellation_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Write or patch every block. Failures are recorded per block and do
    /// not stop the remaining blocks.
    pub fn reconstruct(&self, blocks: &[CodeBlock], notifier: &Notifier) -> ReconstructionOutcome {
        let mut outcome = ReconstructionOutcome::default();
        let total = blocks.len();

        for (index, block) in blocks.iter().enumerate() {
            if self.is_cancelled() {
                tracing::info!("Reconstruction cancelled after {} of {} blocks", index, total);
                outcome.cancelled = true;
                return outcome;
            }

            let normalized = PathFormatter::normalize_header_path(&block.path, block.style);
            notifier.status(&format!("Writing: {}", normalized));

            if block.is_binary_placeholder() {
                tracing::debug!("Skipping binary placeholder for {}", normalized);
                outcome.skipped.push(SkipEntry {
                    path: normalized,
                    reason: "binary placeholder".to_string(),
                });
            } else {
                match self.apply(block, &normalized) {
                    Ok(Applied::Written) => outcome.written += 1,
                    Ok(Applied::Patched) => outcome.patched += 1,
                    Ok(Applied::ClassNotFound(class_name)) => outcome.skipped.push(SkipEntry {
                        path: normalized,
                        reason: format!("class {} not found", class_name),
                    }),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        outcome.failures.push(FailureEntry {
                            path: normalized,
                            error: e.to_string(),
                        });
                    }
                }
            }

            notifier.progress_of(index + 1, total);
        }

        tracing::info!(
            "Reconstructed {} files, patched {} classes under {:?}",
            outcome.written,
            outcome.patched,
            self.root
        );
        outcome
    }

    fn apply(&self, block: &CodeBlock, normalized: &str) -> Result<Applied, WriteError> {
        let target = PathFormatter::resolve_within(&self.root, normalized)?;
        PathFormatter::ensure_real_within(&self.root, &target, normalized)?;

        if let Some(class_name) = &block.update_class {
            return if update_class_in_file(&target, class_name, &block.content)? {
                Ok(Applied::Patched)
            } else {
                Ok(Applied::ClassNotFound(class_name.clone()))
            };
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        fs::write(&target, &block.content).map_err(|e| WriteError::WriteFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Wrote {:?}", target);
        Ok(Applied::Written)
    }
}
