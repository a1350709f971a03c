/// Settings for treedoc runs
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Settings file > Defaults
///
/// Settings are read once when an extractor is built and then shared as an
/// immutable snapshot for the whole run.
use crate::error::{ConfigError, TreeDocError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Path rendering and output location
    #[serde(default)]
    pub paths: PathsConfig,

    /// Directory ignore rules
    #[serde(default)]
    pub directories: DirectoriesConfig,

    /// File ignore rules
    #[serde(default)]
    pub files: FilesConfig,

    /// Allow-list mode
    #[serde(default)]
    pub file_specific: FileSpecificConfig,

    /// Metric rendering
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Artifact naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Named file lists usable as allow-lists
    #[serde(default)]
    pub presets: BTreeMap<String, Vec<String>>,
}

/// Separator/prefix convention used when rendering a canonical path for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `..\dir\file.ext`
    #[default]
    Windows,
    /// `./dir/file.ext`
    Unix,
}

impl PathStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStyle::Windows => "windows",
            PathStyle::Unix => "unix",
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" => Ok(PathStyle::Windows),
            "unix" => Ok(PathStyle::Unix),
            other => Err(ConfigError::InvalidValue {
                key: "paths.path_style".to_string(),
                reason: format!("must be 'windows' or 'unix', got '{}'", other),
            }),
        }
    }
}

/// Unit used for the size token of the metrics string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SizeUnit {
    B,
    #[default]
    KB,
    MB,
    GB,
}

impl SizeUnit {
    /// Number of bytes in one unit (binary multiples)
    pub fn divisor(&self) -> u64 {
        match self {
            SizeUnit::B => 1,
            SizeUnit::KB => 1024,
            SizeUnit::MB => 1024 * 1024,
            SizeUnit::GB => 1024 * 1024 * 1024,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "B" => Ok(SizeUnit::B),
            "KB" => Ok(SizeUnit::KB),
            "MB" => Ok(SizeUnit::MB),
            "GB" => Ok(SizeUnit::GB),
            other => Err(ConfigError::InvalidValue {
                key: "metrics.size_unit".to_string(),
                reason: format!("must be one of B, KB, MB, GB, got '{}'", other),
            }),
        }
    }
}

/// `[paths]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default)]
    pub path_style: PathStyle,

    /// Default output directory when the caller does not pass one
    #[serde(default)]
    pub output_dir: String,

    /// Paths (absolute, base-relative, or glob patterns) that are never walked
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

/// `[directories]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoriesConfig {
    /// Directory basenames pruned with their whole subtree
    #[serde(default = "default_ignored_directories")]
    pub ignored_directories: Vec<String>,

    /// Also honour .gitignore / .ignore files found in the tree
    #[serde(default)]
    pub respect_gitignore: bool,
}

/// `[files]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilesConfig {
    /// Extensions to skip, with or without the leading dot
    #[serde(default = "default_ignored_extensions")]
    pub ignored_extensions: Vec<String>,

    /// File basenames to skip
    #[serde(default)]
    pub ignored_files: Vec<String>,
}

/// `[file_specific]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FileSpecificConfig {
    #[serde(default)]
    pub use_file_specific: bool,

    /// Basenames or base-relative paths that are the only files included
    #[serde(default)]
    pub specific_files: Vec<String>,

    /// Preset whose files are added to `specific_files`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_preset: Option<String>,
}

/// `[metrics]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default)]
    pub size_unit: SizeUnit,

    /// Files larger than this (in bytes) keep a placeholder instead of content
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_markdown_prefix")]
    pub markdown_file_prefix: String,

    #[serde(default = "default_csv_prefix")]
    pub csv_file_prefix: String,
}

// Default value functions
fn default_ignored_directories() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "__pycache__".to_string(),
        "target".to_string(),
        ".venv".to_string(),
    ]
}

fn default_ignored_extensions() -> Vec<String> {
    vec![".exe".to_string(), ".dll".to_string(), ".pyc".to_string()]
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_markdown_prefix() -> String {
    "Full_Project".to_string()
}

fn default_csv_prefix() -> String {
    "Detailed_Project".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            path_style: PathStyle::default(),
            output_dir: String::new(),
            skip_paths: Vec::new(),
        }
    }
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            ignored_directories: default_ignored_directories(),
            respect_gitignore: false,
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            ignored_extensions: default_ignored_extensions(),
            ignored_files: Vec::new(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            size_unit: SizeUnit::default(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            markdown_file_prefix: default_markdown_prefix(),
            csv_file_prefix: default_csv_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from file
    pub fn from_file(path: &Path) -> Result<Self, TreeDocError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read settings file: {}", e)))?;

        let settings = Self::from_toml_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text.
    ///
    /// Backslashes are rewritten to forward slashes first so Windows paths
    /// can be written without escaping.
    pub fn from_toml_str(content: &str) -> Result<Self, TreeDocError> {
        let content = content.replace('\\', "/");
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;
        Ok(settings)
    }

    /// Load the settings snapshot for a run.
    ///
    /// A missing file falls back to defaults; an unreadable or malformed file
    /// is fatal. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, TreeDocError> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                tracing::info!("Loading settings from: {}", path.display());
                Self::from_file(path)?
            }
            Some(path) => {
                tracing::info!(
                    "Settings file {} not found, using defaults",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<(), TreeDocError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write settings file: {}", e)))?;

        tracing::info!("Saved settings to: {}", path.display());
        Ok(())
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), TreeDocError> {
        if self.metrics.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "metrics.max_file_size".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.output.markdown_file_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.markdown_file_prefix".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.output.csv_file_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.csv_file_prefix".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if let Some(preset) = &self.file_specific.active_preset
            && !self.presets.contains_key(preset)
        {
            return Err(ConfigError::InvalidValue {
                key: "file_specific.active_preset".to_string(),
                reason: format!("preset '{}' is not defined in [presets]", preset),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment, or a map in tests)
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(style) = lookup("TREEDOC_PATH_STYLE") {
            match style.parse() {
                Ok(style) => self.paths.path_style = style,
                Err(e) => tracing::warn!("Ignoring TREEDOC_PATH_STYLE: {}", e),
            }
        }

        if let Some(dir) = lookup("TREEDOC_OUTPUT_DIR") {
            self.paths.output_dir = dir;
        }

        if let Some(unit) = lookup("TREEDOC_SIZE_UNIT") {
            match unit.parse() {
                Ok(unit) => self.metrics.size_unit = unit,
                Err(e) => tracing::warn!("Ignoring TREEDOC_SIZE_UNIT: {}", e),
            }
        }
    }

    /// Configured output directory, if any
    pub fn output_dir(&self) -> Option<PathBuf> {
        let dir = self.paths.output_dir.trim();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    }

    /// Full allow-list for file-specific mode: explicit files plus the active preset
    pub fn specific_files(&self) -> Vec<String> {
        let mut files = self.file_specific.specific_files.clone();
        if let Some(preset) = self
            .file_specific
            .active_preset
            .as_ref()
            .and_then(|name| self.presets.get(name))
        {
            for file in preset {
                if !files.contains(file) {
                    files.push(file.clone());
                }
            }
        }
        files
    }
}
