//! Run boundary: one extractor per export or reconstruction
//!
//! An [`Extractor`] is built from an input path, an output path and an
//! optional settings file. Settings are loaded once at construction and
//! shared read-only for the run. `run()` executes synchronously on the
//! calling thread; `stop()` (or a [`StopHandle`] moved to another thread)
//! asks it to finish early.

use crate::config::Settings;
use crate::error::{NotFoundError, Result, TreeDocError, WriteError};
use crate::export::{DocumentExporter, TabularExporter, artifact_file_name};
use crate::notifier::Notifier;
use crate::reverse::{CodeBlockParser, FileTreeReconstructor, ParsedDocument, TabularReader};
use crate::types::{ExtractionKind, RunReport};
use crate::walker::TreeWalker;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Cloneable handle that stops a running extractor
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct Extractor {
    kind: ExtractionKind,
    input: PathBuf,
    output: PathBuf,
    settings: Arc<Settings>,
    notifier: Notifier,
    cancelled: Arc<AtomicBool>,
}

impl Extractor {
    /// Load settings and check the input, failing before any output exists.
    ///
    /// Without an explicit `output`, the configured `paths.output_dir` is
    /// used, then the input directory (forward) or the artifact's directory
    /// (reverse).
    pub fn new(
        kind: ExtractionKind,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        settings_path: Option<&Path>,
        notifier: Notifier,
    ) -> Result<Self> {
        let settings = Settings::load(settings_path)?;
        Self::with_settings(kind, input, output, settings, notifier)
    }

    /// Build from an already loaded settings value
    pub fn with_settings(
        kind: ExtractionKind,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        settings: Settings,
        notifier: Notifier,
    ) -> Result<Self> {
        settings.validate()?;
        let input = input.as_ref().to_path_buf();
        check_input(kind, &input)?;

        let output = output
            .map(Path::to_path_buf)
            .or_else(|| settings.output_dir())
            .unwrap_or_else(|| default_output(kind, &input));

        tracing::info!(
            "Prepared {} extraction: {:?} -> {:?}",
            kind,
            input,
            output
        );

        Ok(Self {
            kind,
            input,
            output,
            settings: Arc::new(settings),
            notifier,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn kind(&self) -> ExtractionKind {
        self.kind
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Request the run to stop. Before `run()`, the run does nothing at all.
    pub fn stop(&self) {
        tracing::info!("Stop requested for {} extraction", self.kind);
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.cancelled))
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Execute the extraction
    pub fn run(&self) -> Result<RunReport> {
        let start = Instant::now();

        if self.is_cancelled() {
            tracing::info!("{} extraction stopped before it started", self.kind);
            return Ok(RunReport::cancelled(self.kind));
        }

        self.notifier.reset();
        self.notifier.progress(0);
        self.notifier.status(&format!("Starting {} extraction", self.kind));

        let mut report = if self.kind.is_reverse() {
            self.run_reverse()?
        } else {
            self.run_forward()?
        };
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.cancelled {
            self.notifier.status("Stopped");
        } else {
            self.notifier.progress(100);
            self.notifier.status("Completed");
        }

        tracing::info!(
            "{} extraction finished in {}ms: {} records, {} failures",
            self.kind,
            report.duration_ms,
            report.records,
            report.failures.len()
        );
        Ok(report)
    }

    fn run_forward(&self) -> Result<RunReport> {
        let mut walker = TreeWalker::new(&self.input, Arc::clone(&self.settings))?
            .with_cancellation_flag(Arc::clone(&self.cancelled));
        match nested_output(&self.input, &self.output) {
            Some(inside) if inside == self.input => {
                tracing::debug!("Excluding earlier artifacts in {:?} from the walk", inside);
                walker = walker.with_excluded_artifacts(inside);
            }
            Some(inside) => {
                tracing::debug!("Excluding output directory {:?} from the walk", inside);
                walker = walker.with_excluded(inside);
            }
            None => {}
        }

        let outcome = walker.walk(&self.notifier)?;

        let mut report = RunReport::new(self.kind);
        report.records = outcome.records.len();
        report.skipped = outcome.skipped;
        report.failures = outcome.failures;
        if outcome.cancelled {
            report.cancelled = true;
            return Ok(report);
        }

        fs::create_dir_all(&self.output).map_err(|e| WriteError::CreateDirFailed {
            path: self.output.display().to_string(),
            reason: e.to_string(),
        })?;

        let generated = chrono::Local::now().naive_local();
        let (prefix, extension) = match self.kind {
            ExtractionKind::Markdown => (&self.settings.output.markdown_file_prefix, "md"),
            _ => (&self.settings.output.csv_file_prefix, "csv"),
        };
        let artifact = self.output.join(artifact_file_name(prefix, extension, generated));

        let unit = self.settings.metrics.size_unit;
        match self.kind {
            ExtractionKind::Markdown => {
                let document =
                    DocumentExporter::new(project_title(&self.input), unit).render(&outcome.records, generated);
                fs::write(&artifact, document).map_err(|e| artifact_failed(&artifact, e))?;
            }
            _ => {
                let file = File::create(&artifact).map_err(|e| artifact_failed(&artifact, e))?;
                let mut out = BufWriter::new(file);
                TabularExporter::new(unit).write(&outcome.records, &mut out)?;
                out.flush().map_err(|e| artifact_failed(&artifact, e))?;
            }
        }

        tracing::info!("Wrote {} records to {:?}", report.records, artifact);
        report.artifact = Some(artifact.display().to_string());
        Ok(report)
    }

    fn run_reverse(&self) -> Result<RunReport> {
        let style = self.settings.paths.path_style;
        let parsed: ParsedDocument = match self.kind {
            ExtractionKind::ReverseMarkdown => {
                let text = fs::read_to_string(&self.input)?;
                CodeBlockParser::new(style).parse(&text)
            }
            _ => TabularReader::new(style).read(File::open(&self.input)?)?,
        };

        tracing::info!(
            "Read {} blocks from {:?} ({} warnings)",
            parsed.blocks.len(),
            self.input,
            parsed.warnings.len()
        );

        let outcome = FileTreeReconstructor::new(&self.output)
            .with_cancellation_flag(Arc::clone(&self.cancelled))
            .reconstruct(&parsed.blocks, &self.notifier);

        let mut report = RunReport::new(self.kind);
        report.records = parsed.blocks.len();
        report.warnings = parsed.warnings.iter().map(ToString::to_string).collect();
        report.written = outcome.written;
        report.patched = outcome.patched;
        report.skipped = outcome.skipped;
        report.failures = outcome.failures;
        report.cancelled = outcome.cancelled;
        Ok(report)
    }
}

fn check_input(kind: ExtractionKind, input: &Path) -> Result<()> {
    let shown = input.display().to_string();
    if kind.is_reverse() {
        if !input.is_file() {
            return Err(NotFoundError::InputArtifact(shown).into());
        }
    } else if !input.exists() {
        return Err(NotFoundError::BaseDirectory(shown).into());
    } else if !input.is_dir() {
        return Err(NotFoundError::NotADirectory(shown).into());
    }
    Ok(())
}

fn default_output(kind: ExtractionKind, input: &Path) -> PathBuf {
    if kind.is_reverse() {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        input.to_path_buf()
    }
}

/// `output` expressed under `base` when it lies inside it; `base` itself when equal
fn nested_output(base: &Path, output: &Path) -> Option<PathBuf> {
    let base_abs = absolute(base);
    let output_abs = absolute(output);
    let relative = output_abs.strip_prefix(&base_abs).ok()?;
    if relative.as_os_str().is_empty() {
        return Some(base.to_path_buf());
    }
    Some(base.join(relative))
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn project_title(input: &Path) -> String {
    absolute(input)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}

fn artifact_failed(path: &Path, e: std::io::Error) -> TreeDocError {
    WriteError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

/// Export `input` to a markdown document under `output`
pub fn markdown_extraction(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    settings_path: Option<&Path>,
) -> Result<RunReport> {
    Extractor::new(
        ExtractionKind::Markdown,
        input,
        Some(output.as_ref()),
        settings_path,
        Notifier::new(),
    )?
    .run()
}

/// Export `input` to a CSV dataset under `output`
pub fn csv_extraction(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    settings_path: Option<&Path>,
) -> Result<RunReport> {
    Extractor::new(
        ExtractionKind::Csv,
        input,
        Some(output.as_ref()),
        settings_path,
        Notifier::new(),
    )?
    .run()
}

/// Rebuild the files described by a markdown document under `output`
pub fn reverse_markdown_extraction(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    settings_path: Option<&Path>,
) -> Result<RunReport> {
    Extractor::new(
        ExtractionKind::ReverseMarkdown,
        input,
        Some(output.as_ref()),
        settings_path,
        Notifier::new(),
    )?
    .run()
}

/// Rebuild the files described by a CSV dataset under `output`
pub fn reverse_csv_extraction(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    settings_path: Option<&Path>,
) -> Result<RunReport> {
    Extractor::new(
        ExtractionKind::ReverseCsv,
        input,
        Some(output.as_ref()),
        settings_path,
        Notifier::new(),
    )?
    .run()
}
