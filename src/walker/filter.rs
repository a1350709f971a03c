//! Include/skip decisions for walked directories and files

use crate::config::Settings;
use crate::error::ConfigError;
use crate::export::is_artifact_file_name;
use crate::paths::PathFormatter;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why an entry was left out of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SkipPath,
    IgnoredDirectory,
    IgnoredExtension,
    IgnoredFile,
    NotInAllowList,
    OutputDirectory,
    ExportArtifact,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::SkipPath => "matches skip path",
            SkipReason::IgnoredDirectory => "ignored directory",
            SkipReason::IgnoredExtension => "ignored extension",
            SkipReason::IgnoredFile => "ignored file",
            SkipReason::NotInAllowList => "not in file-specific list",
            SkipReason::OutputDirectory => "output directory",
            SkipReason::ExportArtifact => "previous export artifact",
        };
        f.write_str(reason)
    }
}

/// Ignore rules compiled once from a settings snapshot
#[derive(Debug, Clone)]
pub struct ConfigFilter {
    base: PathBuf,
    skip_paths: Vec<PathBuf>,
    skip_globs: GlobSet,
    ignored_directories: HashSet<String>,
    /// Lowercase, without the leading dot
    ignored_extensions: HashSet<String>,
    ignored_files: HashSet<String>,
    allow_list: Option<HashSet<String>>,
    excluded: Vec<PathBuf>,
    /// Directory receiving artifacts, when it is walked itself
    artifact_dir: Option<PathBuf>,
    /// (prefix, extension) pairs of artifact names
    artifact_names: Vec<(String, &'static str)>,
}

impl ConfigFilter {
    /// Compile the rules for a walk rooted at `base`.
    ///
    /// Skip entries containing glob metacharacters are matched against the
    /// canonical relative path; all others are paths, absolute or relative to `base`.
    pub fn new(base: &Path, settings: &Settings) -> Result<Self, ConfigError> {
        let mut skip_paths = Vec::new();
        let mut globs = GlobSetBuilder::new();

        for entry in &settings.paths.skip_paths {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            if entry.contains(['*', '?', '[', '{']) {
                let glob = Glob::new(entry).map_err(|e| ConfigError::InvalidValue {
                    key: "paths.skip_paths".to_string(),
                    reason: format!("invalid glob '{}': {}", entry, e),
                })?;
                globs.add(glob);
            } else {
                let path = Path::new(entry);
                skip_paths.push(if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base.join(path)
                });
            }
        }

        let skip_globs = globs.build().map_err(|e| ConfigError::InvalidValue {
            key: "paths.skip_paths".to_string(),
            reason: e.to_string(),
        })?;

        let allow_list = settings
            .file_specific
            .use_file_specific
            .then(|| {
                settings
                    .specific_files()
                    .iter()
                    .map(|f| f.trim().trim_start_matches("./").replace('\\', "/"))
                    .collect()
            });

        Ok(Self {
            base: base.to_path_buf(),
            skip_paths,
            skip_globs,
            ignored_directories: settings.directories.ignored_directories.iter().cloned().collect(),
            ignored_extensions: settings
                .files
                .ignored_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            ignored_files: settings.files.ignored_files.iter().cloned().collect(),
            allow_list,
            excluded: Vec::new(),
            artifact_dir: None,
            artifact_names: vec![
                (settings.output.markdown_file_prefix.clone(), "md"),
                (settings.output.csv_file_prefix.clone(), "csv"),
            ],
        })
    }

    /// Exclude a subtree regardless of settings (the output directory)
    pub fn with_excluded(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Leave out files directly inside `dir` named like an export artifact
    pub fn with_excluded_artifacts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    fn is_artifact(&self, path: &Path, name: &str) -> bool {
        self.artifact_dir
            .as_deref()
            .is_some_and(|dir| path.parent() == Some(dir))
            && self
                .artifact_names
                .iter()
                .any(|(prefix, extension)| is_artifact_file_name(name, prefix, extension))
    }

    fn skip_path_reason(&self, path: &Path) -> Option<SkipReason> {
        if self.excluded.iter().any(|excluded| path.starts_with(excluded)) {
            return Some(SkipReason::OutputDirectory);
        }

        if self.skip_paths.iter().any(|skip| path.starts_with(skip)) {
            return Some(SkipReason::SkipPath);
        }

        if !self.skip_globs.is_empty() {
            let canonical = PathFormatter::canonical(&self.base, path);
            if self.skip_globs.is_match(&canonical) {
                return Some(SkipReason::SkipPath);
            }
        }

        None
    }

    /// Reason to prune a directory with its subtree, if any
    pub fn check_directory(&self, path: &Path) -> Option<SkipReason> {
        if let Some(reason) = self.skip_path_reason(path) {
            return Some(reason);
        }

        let name = path.file_name()?.to_string_lossy();
        self.ignored_directories
            .contains(name.as_ref())
            .then_some(SkipReason::IgnoredDirectory)
    }

    /// Reason to leave a file out, if any. Rules apply in a fixed order.
    pub fn check_file(&self, path: &Path) -> Option<SkipReason> {
        if let Some(reason) = self.skip_path_reason(path) {
            return Some(reason);
        }

        if let Some(extension) = path.extension().and_then(|e| e.to_str())
            && self.ignored_extensions.contains(&normalize_extension(extension))
        {
            return Some(SkipReason::IgnoredExtension);
        }

        let name = path.file_name()?.to_string_lossy().to_string();
        if self.is_artifact(path, &name) {
            return Some(SkipReason::ExportArtifact);
        }

        if self.ignored_files.contains(&name) {
            return Some(SkipReason::IgnoredFile);
        }

        if let Some(allow_list) = &self.allow_list {
            let canonical = PathFormatter::canonical(&self.base, path);
            if !allow_list.contains(&name) && !allow_list.contains(&canonical) {
                return Some(SkipReason::NotInAllowList);
            }
        }

        None
    }

}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with(configure: impl FnOnce(&mut Settings)) -> ConfigFilter {
        let mut settings = Settings::default();
        configure(&mut settings);
        ConfigFilter::new(Path::new("/project"), &settings).unwrap()
    }

    #[test]
    fn test_ignored_directory() {
        let filter = filter_with(|_| {});
        assert!(filter.check_directory(Path::new("/project/node_modules")).is_some());
        assert!(filter.check_directory(Path::new("/project/src/__pycache__")).is_some());
        assert!(filter.check_directory(Path::new("/project/src")).is_none());
    }

    #[test]
    fn test_directory_names_are_case_sensitive() {
        let filter = filter_with(|_| {});
        assert!(filter.check_directory(Path::new("/project/Node_Modules")).is_none());
    }

    #[test]
    fn test_absolute_skip_path() {
        let filter = filter_with(|s| s.paths.skip_paths = vec!["/project/skip_me".to_string()]);
        assert!(filter.check_directory(Path::new("/project/skip_me")).is_some());
        assert!(filter.check_file(Path::new("/project/skip_me/inner/a.py")).is_some());
        // component match, not string prefix
        assert!(filter.check_directory(Path::new("/project/skip_me_not")).is_none());
    }

    #[test]
    fn test_relative_skip_path() {
        let filter = filter_with(|s| s.paths.skip_paths = vec!["build/out".to_string()]);
        assert_eq!(
            filter.check_directory(Path::new("/project/build/out")),
            Some(SkipReason::SkipPath)
        );
        assert!(filter.check_directory(Path::new("/project/build")).is_none());
    }

    #[test]
    fn test_glob_skip_path() {
        let filter = filter_with(|s| s.paths.skip_paths = vec!["**/generated/**".to_string()]);
        assert!(filter.check_file(Path::new("/project/src/generated/api.rs")).is_some());
        assert!(filter.check_file(Path::new("/project/src/api.rs")).is_none());
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let mut settings = Settings::default();
        settings.paths.skip_paths = vec!["src/[".to_string()];
        assert!(ConfigFilter::new(Path::new("/project"), &settings).is_err());
    }

    #[test]
    fn test_ignored_extension_with_or_without_dot() {
        let filter = filter_with(|s| {
            s.files.ignored_extensions = vec![".pyc".to_string(), "log".to_string()]
        });
        assert_eq!(
            filter.check_file(Path::new("/project/a.pyc")),
            Some(SkipReason::IgnoredExtension)
        );
        assert!(filter.check_file(Path::new("/project/run.LOG")).is_some());
        assert!(filter.check_file(Path::new("/project/a.py")).is_none());
    }

    #[test]
    fn test_ignored_file() {
        let filter = filter_with(|s| s.files.ignored_files = vec!["ignored.txt".to_string()]);
        assert_eq!(
            filter.check_file(Path::new("/project/sub/ignored.txt")),
            Some(SkipReason::IgnoredFile)
        );
    }

    #[test]
    fn test_file_specific_mode() {
        let filter = filter_with(|s| {
            s.file_specific.use_file_specific = true;
            s.file_specific.specific_files = vec!["test.py".to_string(), "./docs/guide.md".to_string()];
        });
        assert!(filter.check_file(Path::new("/project/test.py")).is_none());
        assert!(filter.check_file(Path::new("/project/nested/test.py")).is_none());
        assert!(filter.check_file(Path::new("/project/docs/guide.md")).is_none());
        assert_eq!(
            filter.check_file(Path::new("/project/other.py")),
            Some(SkipReason::NotInAllowList)
        );
    }

    #[test]
    fn test_file_specific_uses_active_preset() {
        let filter = filter_with(|s| {
            s.file_specific.use_file_specific = true;
            s.presets.insert("core".to_string(), vec!["main.py".to_string()]);
            s.file_specific.active_preset = Some("core".to_string());
        });
        assert!(filter.check_file(Path::new("/project/main.py")).is_none());
        assert!(filter.check_file(Path::new("/project/util.py")).is_some());
    }

    #[test]
    fn test_ignore_rules_precede_allow_list() {
        let filter = filter_with(|s| {
            s.file_specific.use_file_specific = true;
            s.file_specific.specific_files = vec!["keep.pyc".to_string()];
        });
        assert_eq!(
            filter.check_file(Path::new("/project/keep.pyc")),
            Some(SkipReason::IgnoredExtension)
        );
    }

    #[test]
    fn test_excluded_output_directory() {
        let filter = filter_with(|_| {}).with_excluded("/project/exports");
        assert_eq!(
            filter.check_directory(Path::new("/project/exports")),
            Some(SkipReason::OutputDirectory)
        );
    }

    #[test]
    fn test_excluded_artifacts_only_in_output_directory() {
        let filter = filter_with(|_| {}).with_excluded_artifacts("/project");
        assert_eq!(
            filter.check_file(Path::new("/project/Full_Project_20240309_070501.md")),
            Some(SkipReason::ExportArtifact)
        );
        assert_eq!(
            filter.check_file(Path::new("/project/Detailed_Project_20240309_070501.csv")),
            Some(SkipReason::ExportArtifact)
        );
        assert!(filter.check_file(Path::new("/project/docs/Full_Project_20240309_070501.md")).is_none());
        assert!(filter.check_file(Path::new("/project/Full_Project_notes.md")).is_none());

        let filter = filter_with(|_| {});
        assert!(filter.check_file(Path::new("/project/Full_Project_20240309_070501.md")).is_none());
    }
}
