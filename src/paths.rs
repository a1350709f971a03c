/// Path normalization and display rendering
///
/// Every walked file is identified by a canonical, root-relative,
/// forward-slash path (`src/app.py`). Artifacts show that path in a display
/// style, and the reverse direction strips display decorations from header
/// tokens before resolving them under the reconstruction root.
use crate::config::PathStyle;
use crate::error::WriteError;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// `file://`, `vscode://` and similar URI scheme prefixes
static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

/// `path:` prefix, case-insensitive, optional whitespace after the colon
static PATH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^path:\s*").expect("valid path-prefix regex"));

/// Stateless path formatter
pub struct PathFormatter;

impl PathFormatter {
    /// Canonical form of `path` relative to `base`: forward slashes, no `.` segments.
    ///
    /// Paths outside `base` keep their own components.
    pub fn canonical(base: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(base).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Render a canonical path in a display style.
    ///
    /// The windows marker is the literal `..` regardless of depth.
    pub fn display(canonical: &str, style: PathStyle) -> String {
        let trimmed = canonical.trim_start_matches("./").trim_start_matches('/');
        match style {
            PathStyle::Windows => format!("..\\{}", trimmed.replace('/', "\\")),
            PathStyle::Unix => format!("./{}", trimmed),
        }
    }

    /// Strip header decorations from a path token, yielding `./<relative path>`.
    ///
    /// Recognized decorations: surrounding backticks/quotes/brackets, URI-like
    /// scheme prefixes, a `path:` prefix, the windows display marker (only when
    /// parsing in windows style), and redundant leading `./` or `/`.
    pub fn normalize_header_path(token: &str, style: PathStyle) -> String {
        let mut path = token.trim();

        for (open, close) in [('`', '`'), ('"', '"'), ('\'', '\''), ('[', ']'), ('<', '>')] {
            if path.len() >= 2 && path.starts_with(open) && path.ends_with(close) {
                path = path[1..path.len() - 1].trim();
            }
        }

        let path = SCHEME_PREFIX.replace(path, "");
        let path = PATH_PREFIX.replace(&path, "");
        let mut path = path.replace('\\', "/");

        if style == PathStyle::Windows {
            if let Some(rest) = path.strip_prefix("../") {
                path = rest.to_string();
            } else if path == ".." {
                path.clear();
            }
        }

        let mut rest = path.as_str();
        loop {
            if let Some(stripped) = rest.strip_prefix("./") {
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix('/') {
                rest = stripped;
            } else {
                break;
            }
        }

        format!("./{}", rest)
    }

    /// Resolve a normalized path under `root`, refusing anything that would
    /// land outside it.
    pub fn resolve_within(root: &Path, normalized: &str) -> Result<PathBuf, WriteError> {
        let mut clean = PathBuf::new();
        let mut depth = 0usize;

        for component in Path::new(normalized).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => {
                    clean.push(part);
                    depth += 1;
                }
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(WriteError::PathEscapesRoot(normalized.to_string()));
                    }
                    clean.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(WriteError::PathEscapesRoot(normalized.to_string()));
                }
            }
        }

        if depth == 0 {
            return Err(WriteError::PathEscapesRoot(normalized.to_string()));
        }

        Ok(root.join(clean))
    }

    /// Check that `target` stays inside `root` once symlinks are followed.
    ///
    /// The deepest part of `target` that already exists below `root` is
    /// resolved on disk; a dangling link counts as escaping.
    pub fn ensure_real_within(root: &Path, target: &Path, shown: &str) -> Result<(), WriteError> {
        let Ok(real_root) = fs::canonicalize(root) else {
            // nothing below a missing root can exist yet
            return Ok(());
        };
        let escapes = || WriteError::PathEscapesRoot(shown.to_string());

        for ancestor in target.ancestors() {
            if ancestor == root {
                break;
            }
            if fs::symlink_metadata(ancestor).is_err() {
                continue;
            }
            let real = fs::canonicalize(ancestor).map_err(|_| escapes())?;
            return if real.starts_with(&real_root) {
                Ok(())
            } else {
                Err(escapes())
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_relative_path() {
        let base = Path::new("/project");
        assert_eq!(
            PathFormatter::canonical(base, Path::new("/project/src/app.py")),
            "src/app.py"
        );
        assert_eq!(
            PathFormatter::canonical(base, Path::new("/project/./README.md")),
            "README.md"
        );
    }

    #[test]
    fn test_display_windows_style() {
        let display = PathFormatter::display("test/path/file.py", PathStyle::Windows);
        assert_eq!(display, "..\\test\\path\\file.py");
        assert!(display.starts_with(".."));
        assert!(display.contains('\\'));
    }

    #[test]
    fn test_display_unix_style() {
        let display = PathFormatter::display("test/path/file.py", PathStyle::Unix);
        assert_eq!(display, "./test/path/file.py");
    }

    #[test]
    fn test_normalize_decorations() {
        let cases = [
            ("file://test.py", "./test.py"),
            ("path:test.py", "./test.py"),
            ("[test.py]", "./test.py"),
            ("test.py", "./test.py"),
            ("`src/lib.py`", "./src/lib.py"),
            ("././nested/a.py", "./nested/a.py"),
            ("PATH: docs/readme.md", "./docs/readme.md"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                PathFormatter::normalize_header_path(input, PathStyle::Unix),
                expected,
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_normalize_windows_display_marker() {
        assert_eq!(
            PathFormatter::normalize_header_path("..\\sub\\file.py", PathStyle::Windows),
            "./sub/file.py"
        );
        // unix parsing leaves the parent segment for the resolver to reject
        assert_eq!(
            PathFormatter::normalize_header_path("..\\sub\\file.py", PathStyle::Unix),
            "./../sub/file.py"
        );
    }

    #[test]
    fn test_display_then_normalize_round_trip() {
        for style in [PathStyle::Windows, PathStyle::Unix] {
            let display = PathFormatter::display("a/b/c.rs", style);
            assert_eq!(
                PathFormatter::normalize_header_path(&display, style),
                "./a/b/c.rs"
            );
        }
    }

    #[test]
    fn test_resolve_within_root() {
        let root = Path::new("/out");
        assert_eq!(
            PathFormatter::resolve_within(root, "./sub/file.py").unwrap(),
            PathBuf::from("/out/sub/file.py")
        );
        assert_eq!(
            PathFormatter::resolve_within(root, "./sub/../file.py").unwrap(),
            PathBuf::from("/out/file.py")
        );
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let root = Path::new("/out");
        assert!(matches!(
            PathFormatter::resolve_within(root, "./../etc/passwd"),
            Err(WriteError::PathEscapesRoot(_))
        ));
        assert!(PathFormatter::resolve_within(root, "./a/../../b").is_err());
        assert!(PathFormatter::resolve_within(root, "./").is_err());
    }

    #[test]
    fn test_real_containment_for_plain_paths() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("src")).unwrap();

        assert!(PathFormatter::ensure_real_within(root, &root.join("src/new/a.py"), "./src/new/a.py").is_ok());
        assert!(PathFormatter::ensure_real_within(root, &root.join("fresh.py"), "./fresh.py").is_ok());

        let missing = root.join("not-yet");
        assert!(PathFormatter::ensure_real_within(&missing, &missing.join("a.py"), "./a.py").is_ok());
    }
}
