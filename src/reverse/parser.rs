//! Header + fence scanner for markdown documents
//!
//! The scanner is either outside a fence or inside one. Outside, it looks
//! for `#... File: <path>` headers and opening fences; a header is held as
//! pending until the next non-blank line, which must open a fence. Inside,
//! every line is content until a closing fence of the same character and at
//! least the same length.

use super::CodeBlock;
use crate::config::PathStyle;
use crate::error::ParseWarning;
use crate::language::detect_language_for_path;
use crate::paths::PathFormatter;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `## File: <path>` with an optional trailing `(Class: <Name>)`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#+\s*(?i:file):\s*(?P<path>.+?)(?:\s*\((?i:class):\s*(?P<class>[^()]+?)\s*\))?\s*$")
        .expect("valid header regex")
});

/// Blocks and warnings read from one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub blocks: Vec<CodeBlock>,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug)]
struct Header {
    path: String,
    update_class: Option<String>,
    line: usize,
}

#[derive(Debug)]
struct OpenFence {
    header: Option<Header>,
    fence_char: char,
    fence_len: usize,
    language: String,
    body: String,
    /// Opening fence line ended in `\r\n`
    crlf: bool,
}

#[derive(Debug)]
enum ScanState {
    Outside { pending: Option<Header> },
    InFence(OpenFence),
}

pub struct CodeBlockParser {
    style: PathStyle,
}

impl CodeBlockParser {
    pub fn new(style: PathStyle) -> Self {
        Self { style }
    }

    pub fn parse(&self, text: &str) -> ParsedDocument {
        let mut doc = ParsedDocument::default();
        let mut state = ScanState::Outside { pending: None };

        for (index, raw_line) in text.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_end_matches(['\n', '\r']);

            state = match state {
                ScanState::Outside { pending } => {
                    self.scan_outside(line, raw_line.ends_with("\r\n"), line_no, pending, &mut doc)
                }
                ScanState::InFence(mut open) => {
                    if is_closing_fence(line, open.fence_char, open.fence_len) {
                        self.finish_block(open, &mut doc);
                        ScanState::Outside { pending: None }
                    } else {
                        open.body.push_str(raw_line);
                        ScanState::InFence(open)
                    }
                }
            };
        }

        match state {
            ScanState::Outside { pending: Some(header) } => {
                doc.warnings.push(ParseWarning::MarkerWithoutFence {
                    line: header.line,
                    path: header.path,
                });
            }
            ScanState::InFence(OpenFence {
                header: Some(header),
                ..
            }) => {
                doc.warnings.push(ParseWarning::UnterminatedFence {
                    line: header.line,
                    path: header.path,
                });
            }
            _ => {}
        }

        for warning in &doc.warnings {
            tracing::warn!("{}", warning);
        }

        doc
    }

    fn scan_outside(
        &self,
        line: &str,
        crlf: bool,
        line_no: usize,
        pending: Option<Header>,
        doc: &mut ParsedDocument,
    ) -> ScanState {
        if let Some(header) = parse_header(line, line_no) {
            if let Some(previous) = pending {
                doc.warnings.push(ParseWarning::MarkerWithoutFence {
                    line: previous.line,
                    path: previous.path,
                });
            }
            return ScanState::Outside {
                pending: Some(header),
            };
        }

        if let Some((fence_char, fence_len, info)) = opening_fence(line) {
            return ScanState::InFence(OpenFence {
                header: pending,
                fence_char,
                fence_len,
                language: info.split_whitespace().next().unwrap_or_default().to_string(),
                body: String::new(),
                crlf,
            });
        }

        if line.trim().is_empty() {
            return ScanState::Outside { pending };
        }

        if let Some(previous) = pending {
            doc.warnings.push(ParseWarning::MarkerWithoutFence {
                line: previous.line,
                path: previous.path,
            });
        }
        ScanState::Outside { pending: None }
    }

    fn finish_block(&self, open: OpenFence, doc: &mut ParsedDocument) {
        let Some(header) = open.header else {
            tracing::debug!("Skipping fenced block without a file header");
            return;
        };

        // The writer adds one line break before the closing fence, in the
        // document's own line ending
        let mut content = open.body;
        if open.crlf && content.ends_with("\r\n") {
            content.truncate(content.len() - 2);
        } else if content.ends_with('\n') {
            content.truncate(content.len() - 1);
        }

        let language = if open.language.is_empty() {
            let normalized = PathFormatter::normalize_header_path(&header.path, self.style);
            detect_language_for_path(Path::new(&normalized)).to_string()
        } else {
            open.language
        };

        doc.blocks.push(CodeBlock {
            path: header.path,
            language,
            content,
            style: self.style,
            update_class: header.update_class,
        });
    }
}

fn parse_header(line: &str, line_no: usize) -> Option<Header> {
    let captures = HEADER.captures(line)?;
    let path = captures.name("path")?.as_str().trim().to_string();
    if path.is_empty() {
        return None;
    }

    Some(Header {
        path,
        update_class: captures.name("class").map(|c| c.as_str().to_string()),
        line: line_no,
    })
}

/// Fence character, run length and info string of an opening fence line
fn opening_fence(line: &str) -> Option<(char, usize, &str)> {
    for fence_char in ['`', '~'] {
        let len = line.chars().take_while(|&c| c == fence_char).count();
        if len >= 3 {
            let info = &line[len..];
            // backtick fences cannot carry backticks in their info string
            if fence_char == '`' && info.contains('`') {
                return None;
            }
            return Some((fence_char, len, info.trim()));
        }
    }
    None
}

fn is_closing_fence(line: &str, fence_char: char, fence_len: usize) -> bool {
    let len = line.chars().take_while(|&c| c == fence_char).count();
    len >= fence_len && line[len..].trim().is_empty()
}
