use super::{CodeBlock, ParsedDocument};
use crate::config::PathStyle;
use crate::error::{ParseWarning, Result};
use crate::language::detect_language_for_path;
use crate::paths::PathFormatter;
use crate::walker::{BINARY_LANGUAGE, BINARY_PLACEHOLDER};
use std::io::Read;
use std::path::Path;

/// Column positions of a tabular artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    path: usize,
    metrics: Option<usize>,
    code: usize,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        path: 0,
        metrics: Some(1),
        code: 2,
    };

    /// Columns named in a header row, or `None` if the row is data
    fn from_header(row: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| row.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let path = find("path")?;
        let code = find("code").unwrap_or(Self::POSITIONAL.code);
        Some(Columns {
            path,
            metrics: find("metrics"),
            code,
        })
    }
}

/// Reads `Path, Metrics, Code` rows back into code blocks.
///
/// A first row naming a `Path` column is taken as the header; otherwise
/// columns are positional and the first row is data.
pub struct TabularReader {
    style: PathStyle,
}

impl TabularReader {
    pub fn new(style: PathStyle) -> Self {
        Self { style }
    }

    pub fn read<R: Read>(&self, input: R) -> Result<ParsedDocument> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut doc = ParsedDocument::default();
        let mut layout = None;

        for (index, result) in reader.records().enumerate() {
            let row_no = index + 1;
            let row = match result {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    doc.warnings.push(ParseWarning::MalformedRow {
                        row: row_no,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let columns = match layout {
                Some(columns) => columns,
                None => {
                    let header = Columns::from_header(&row);
                    let columns = header.unwrap_or(Columns::POSITIONAL);
                    layout = Some(columns);
                    if header.is_some() {
                        continue;
                    }
                    columns
                }
            };

            match self.block_from_row(&row, columns) {
                Ok(block) => doc.blocks.push(block),
                Err(reason) => doc.warnings.push(ParseWarning::MalformedRow {
                    row: row_no,
                    reason,
                }),
            }
        }

        for warning in &doc.warnings {
            tracing::warn!("{}", warning);
        }

        Ok(doc)
    }

    fn block_from_row(
        &self,
        row: &csv::StringRecord,
        columns: Columns,
    ) -> std::result::Result<CodeBlock, String> {
        let path = row
            .get(columns.path)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "missing path".to_string())?;

        let content = row
            .get(columns.code)
            .ok_or_else(|| format!("missing code column for '{}'", path))?;

        // The metrics column is only consulted to recognise binary placeholders
        let is_placeholder = content == BINARY_PLACEHOLDER
            && columns
                .metrics
                .and_then(|i| row.get(i))
                .is_some_and(|m| m.trim_end().ends_with("binary"));

        let language = if is_placeholder {
            BINARY_LANGUAGE
        } else {
            let normalized = PathFormatter::normalize_header_path(path, self.style);
            detect_language_for_path(Path::new(&normalized))
        };

        Ok(CodeBlock {
            path: path.to_string(),
            language: language.to_string(),
            content: content.to_string(),
            style: self.style,
            update_class: None,
        })
    }
}
