//! Programming language detection from file extensions
//!
//! Tags are the lowercase identifiers used as fence info strings
//! (`python`, `cpp`, ...). Anything unknown is `text`.

use std::path::Path;

/// Tag used for unknown extensions and untagged fences
pub const TEXT_LANGUAGE: &str = "text";

/// Detect the fence language tag for a file extension (without the dot)
pub fn detect_language(extension: &str) -> &'static str {
    let lang = match extension.trim_start_matches('.').to_lowercase().as_str() {
        // Programming languages
        "rs" => "rust",
        "py" | "pyw" | "pyi" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "java" => "java",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => "cpp",
        "c" | "h" => "c",
        "cs" => "csharp",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" => "powershell",
        "bat" | "cmd" => "batch",
        "sql" => "sql",
        "lua" => "lua",
        "r" => "r",
        "dart" => "dart",

        // Web technologies
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "vue" => "vue",

        // Data formats and config files
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "ini" | "cfg" | "conf" => "ini",
        "csv" => "csv",

        // Documentation formats
        "md" | "markdown" => "markdown",
        "rst" => "rst",

        _ => return TEXT_LANGUAGE,
    };

    lang
}

/// Detect the language tag for a path.
///
/// A handful of well-known extensionless file names are recognized too.
pub fn detect_language_for_path(path: &Path) -> &'static str {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            "Dockerfile" => return "dockerfile",
            "Makefile" | "makefile" | "GNUmakefile" => return "makefile",
            _ => {}
        }
    }

    path.extension()
        .and_then(|e| e.to_str())
        .map(detect_language)
        .unwrap_or(TEXT_LANGUAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_common() {
        assert_eq!(detect_language("py"), "python");
        assert_eq!(detect_language("js"), "javascript");
        assert_eq!(detect_language("cpp"), "cpp");
        assert_eq!(detect_language("rs"), "rust");
    }

    #[test]
    fn test_detect_language_with_dot() {
        assert_eq!(detect_language(".py"), "python");
    }

    #[test]
    fn test_detect_language_case_insensitive() {
        assert_eq!(detect_language("PY"), "python");
        assert_eq!(detect_language("Ts"), "typescript");
    }

    #[test]
    fn test_detect_language_unknown() {
        assert_eq!(detect_language("unknown"), "text");
        assert_eq!(detect_language(""), "text");
    }

    #[test]
    fn test_detect_language_for_path() {
        assert_eq!(detect_language_for_path(Path::new("test.py")), "python");
        assert_eq!(detect_language_for_path(Path::new("src/app.test.js")), "javascript");
        assert_eq!(detect_language_for_path(Path::new("test.unknown")), "text");
        assert_eq!(detect_language_for_path(Path::new("docker/Dockerfile")), "dockerfile");
        assert_eq!(detect_language_for_path(Path::new("LICENSE")), "text");
    }
}
