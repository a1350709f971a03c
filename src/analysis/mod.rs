//! File metrics: text counts for every text file, structural counts for
//! source files in a linked grammar.

pub mod ast_parser;
pub mod grammar;

pub use ast_parser::{AstParser, StructureCounts, TopLevelItem};

use crate::config::SizeUnit;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Character, word and line counts of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TextMetrics {
    pub char_count: usize,
    pub word_count: usize,
    /// Newline count plus one, so empty content is one line
    pub line_count: usize,
}

impl TextMetrics {
    pub fn from_content(content: &str) -> Self {
        Self {
            char_count: content.chars().count(),
            word_count: content.split_whitespace().count(),
            line_count: content.matches('\n').count() + 1,
        }
    }
}

/// Metrics attached to one walked file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FileMetrics {
    pub size_bytes: u64,
    /// Absent for binary and oversized files
    pub text: Option<TextMetrics>,
    pub structure: Option<StructureCounts>,
}

impl FileMetrics {
    /// Metrics for a file whose content is not exported
    pub fn opaque(size_bytes: u64) -> Self {
        Self {
            size_bytes,
            text: None,
            structure: None,
        }
    }

    /// Compact one-line rendering, e.g. `0.02KB 20C 6W 3L 1Cls 2Fn 2Var`
    pub fn render(&self, unit: SizeUnit) -> String {
        let size = format_size(self.size_bytes, unit);

        let Some(text) = &self.text else {
            return format!("{} binary", size);
        };

        let mut rendered = format!(
            "{} {}C {}W {}L",
            size, text.char_count, text.word_count, text.line_count
        );

        if let Some(structure) = &self.structure {
            rendered.push_str(&format!(
                " {}Cls {}Fn {}Var",
                structure.class_count, structure.function_count, structure.variable_count
            ));
        }

        rendered
    }
}

/// Render a byte count in the given unit: whole bytes, or two decimals otherwise
pub fn format_size(bytes: u64, unit: SizeUnit) -> String {
    match unit {
        SizeUnit::B => format!("{}B", bytes),
        _ => format!(
            "{:.2}{}",
            bytes as f64 / unit.divisor() as f64,
            unit.as_str()
        ),
    }
}

/// Computes file metrics, reusing one parser per extension across a run
#[derive(Default)]
pub struct FileMetricsAnalyzer {
    parsers: HashMap<String, Option<AstParser>>,
}

impl FileMetricsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze text content read from `path`
    pub fn analyze(&mut self, path: &Path, content: &str) -> FileMetrics {
        FileMetrics {
            size_bytes: content.len() as u64,
            text: Some(TextMetrics::from_content(content)),
            structure: self.structure(path, content),
        }
    }

    fn structure(&mut self, path: &Path, content: &str) -> Option<StructureCounts> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        let parser = self
            .parsers
            .entry(extension)
            .or_insert_with(|| AstParser::for_path(path))
            .as_mut()?;

        match parser.structure_counts(content) {
            Ok(counts) => Some(counts),
            Err(e) => {
                tracing::debug!("Structural analysis failed for {:?}: {:#}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_metrics_exact() {
        let metrics = TextMetrics::from_content("Line 1\nLine 2\nLine 3");
        assert_eq!(metrics.char_count, 20);
        assert_eq!(metrics.word_count, 6);
        assert_eq!(metrics.line_count, 3);
    }

    #[test]
    fn test_empty_content_is_one_line() {
        let metrics = TextMetrics::from_content("");
        assert_eq!(metrics, TextMetrics { char_count: 0, word_count: 0, line_count: 1 });
    }

    #[test]
    fn test_trailing_newline_counts_extra_line() {
        assert_eq!(TextMetrics::from_content("a\n").line_count, 2);
    }

    #[test]
    fn test_chars_not_bytes() {
        assert_eq!(TextMetrics::from_content("héllo").char_count, 5);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(20, SizeUnit::B), "20B");
        assert_eq!(format_size(2048, SizeUnit::KB), "2.00KB");
        assert_eq!(format_size(20, SizeUnit::KB), "0.02KB");
        assert_eq!(format_size(3 * 1024 * 1024, SizeUnit::MB), "3.00MB");
    }

    #[test]
    fn test_render_text_file() {
        let mut analyzer = FileMetricsAnalyzer::new();
        let metrics = analyzer.analyze(Path::new("notes.txt"), "Line 1\nLine 2\nLine 3");
        let rendered = metrics.render(SizeUnit::KB);

        assert_eq!(rendered, "0.02KB 20C 6W 3L");
        for token in ["KB", "C", "W", "L"] {
            assert!(rendered.contains(token));
        }
    }

    #[test]
    fn test_render_source_file_has_structure() {
        let source = "class A:\n    def go(self):\n        x = 1\n";
        let mut analyzer = FileMetricsAnalyzer::new();
        let metrics = analyzer.analyze(Path::new("a.py"), source);

        let structure = metrics.structure.unwrap();
        assert_eq!(structure.class_count, 1);
        assert_eq!(structure.function_count, 1);
        assert!(metrics.render(SizeUnit::B).ends_with("1Cls 1Fn 1Var"));
    }

    #[test]
    fn test_render_opaque() {
        assert_eq!(FileMetrics::opaque(4).render(SizeUnit::B), "4B binary");
    }

    #[test]
    fn test_parser_reused_per_extension() {
        let mut analyzer = FileMetricsAnalyzer::new();
        analyzer.analyze(Path::new("a.py"), "x = 1\n");
        analyzer.analyze(Path::new("b.py"), "y = 2\n");
        analyzer.analyze(Path::new("c.md"), "# title\n");
        assert_eq!(analyzer.parsers.len(), 2);
    }
}
