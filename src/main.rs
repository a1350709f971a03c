//! CLI entry point for treedoc

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use treedoc::{ExtractionKind, Extractor, Notifier, TreeDocError};

#[derive(Parser, Debug)]
#[command(name = "treedoc")]
#[command(about = "Flatten a directory tree into Markdown or CSV, and rebuild it")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
))]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a directory to a Markdown document
    ExportMd(RunArgs),
    /// Export a directory to a CSV dataset
    ExportCsv(RunArgs),
    /// Rebuild files from a Markdown document
    ReverseMd(RunArgs),
    /// Rebuild files from a CSV dataset
    ReverseCsv(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Directory to export, or artifact to rebuild from
    input: PathBuf,

    /// Output directory (defaults to `paths.output_dir`, then next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (TOML); missing files fall back to defaults
    #[arg(short, long, env = "TREEDOC_SETTINGS")]
    settings: Option<PathBuf>,
}

impl Command {
    fn split(self) -> (ExtractionKind, RunArgs) {
        match self {
            Command::ExportMd(args) => (ExtractionKind::Markdown, args),
            Command::ExportCsv(args) => (ExtractionKind::Csv, args),
            Command::ReverseMd(args) => (ExtractionKind::ReverseMarkdown, args),
            Command::ReverseCsv(args) => (ExtractionKind::ReverseCsv, args),
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let (kind, run_args) = args.command.split();

    let notifier = Notifier::new().on_status(|status| tracing::debug!("{}", status));
    let extractor = Extractor::new(
        kind,
        &run_args.input,
        run_args.output.as_deref(),
        run_args.settings.as_deref(),
        notifier,
    )?;

    let report = extractor.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.failures.is_empty())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(error_exit_code(&e));
        }
    }
}

/// 3 for bad settings or a missing input, 1 for everything else.
/// Runs with per-file failures exit with 2.
fn error_exit_code(e: &anyhow::Error) -> i32 {
    let user_error = e
        .downcast_ref::<TreeDocError>()
        .is_some_and(TreeDocError::is_user_error);
    if user_error { 3 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treedoc::error::{NotFoundError, WriteError};

    #[test]
    fn test_error_exit_codes() {
        let missing: anyhow::Error =
            TreeDocError::NotFound(NotFoundError::InputArtifact("doc.md".to_string())).into();
        assert_eq!(error_exit_code(&missing), 3);

        let io: anyhow::Error = TreeDocError::from(WriteError::PathEscapesRoot("x".to_string())).into();
        assert_eq!(error_exit_code(&io), 1);
    }
}
