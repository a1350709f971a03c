/// Centralized error types for treedoc using thiserror
///
/// Fatal problems (bad settings, missing inputs) surface as `TreeDocError`.
/// Per-file problems during a run are collected into the run report instead
/// of aborting, so they carry their own smaller enums.
use serde::Serialize;
use thiserror::Error;

/// Main error type for treedoc
#[derive(Error, Debug)]
pub enum TreeDocError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result alias used across the public API
pub type Result<T> = std::result::Result<T, TreeDocError>;

/// Errors related to loading and validating settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse settings: {0}")]
    ParseFailed(String),

    #[error("Invalid setting value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save settings: {0}")]
    SaveFailed(String),

    #[error("Settings file not found: {0}")]
    FileNotFound(String),
}

/// Missing inputs. These are always fatal and raised before any output is produced.
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("Input artifact does not exist: {0}")]
    InputArtifact(String),

    #[error("Base directory does not exist: {0}")]
    BaseDirectory(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),
}

/// Malformed fragments found while reading an artifact back.
///
/// The fragment is skipped and parsing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseWarning {
    #[error("line {line}: file marker for '{path}' is not followed by a fenced block")]
    MarkerWithoutFence { line: usize, path: String },

    #[error("line {line}: fenced block for '{path}' is never closed")]
    UnterminatedFence { line: usize, path: String },

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// Filesystem failures while reconstructing a tree, recorded per file
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WriteError {
    #[error("Failed to create directory '{path}': {reason}")]
    CreateDirFailed { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Path escapes the output root: {0}")]
    PathEscapesRoot(String),

    #[error("Failed to patch class in '{path}': {reason}")]
    PatchFailed { path: String, reason: String },
}

// Conversion from anyhow::Error to TreeDocError
impl From<anyhow::Error> for TreeDocError {
    fn from(err: anyhow::Error) -> Self {
        TreeDocError::Other(format!("{:#}", err))
    }
}

impl TreeDocError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        TreeDocError::Other(msg.into())
    }

    /// Check if this is a user error (bad settings, missing input) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(self, TreeDocError::Config(_) | TreeDocError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TreeDocError::NotFound(NotFoundError::InputArtifact("/tmp/x.md".to_string()));
        assert_eq!(
            err.to_string(),
            "Not found: Input artifact does not exist: /tmp/x.md"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TreeDocError = io_err.into();
        assert!(matches!(err, TreeDocError::Io(_)));
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("test error");
        let err: TreeDocError = anyhow_err.into();
        assert!(matches!(err, TreeDocError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_is_user_error() {
        let user_err = TreeDocError::Config(ConfigError::ParseFailed("bad".to_string()));
        assert!(user_err.is_user_error());

        let system_err =
            TreeDocError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert!(!system_err.is_user_error());
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            key: "metrics.size_unit".to_string(),
            reason: "must be one of B, KB, MB, GB".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting value for 'metrics.size_unit': must be one of B, KB, MB, GB"
        );
    }

    #[test]
    fn test_parse_warning_display() {
        let warning = ParseWarning::UnterminatedFence {
            line: 12,
            path: "src/app.py".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "line 12: fenced block for 'src/app.py' is never closed"
        );
    }

    #[test]
    fn test_write_error_chain() {
        let write_err = WriteError::PathEscapesRoot("../etc/passwd".to_string());
        let err: TreeDocError = write_err.into();
        assert_eq!(
            err.to_string(),
            "Write error: Path escapes the output root: ../etc/passwd"
        );
    }
}
