//! Markdown document rendering
//!
//! Layout of a rendered document:
//!
//! ````text
//! # Project Export: <root name>
//!
//! Generated: 2024-01-01 12:00:00
//! Total files: 2
//!
//! ## File: ..\src\app.py
//!
//! ```python
//! <content>
//! ```
//!
//! *Metrics: 0.02KB 20C 6W 3L*
//! ````
//!
//! The fence around each block is one backtick longer than the longest
//! backtick run inside the content, never shorter than three.

use crate::config::SizeUnit;
use crate::walker::FileRecord;
use chrono::NaiveDateTime;

/// Timestamp layout of the `Generated:` line
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct DocumentExporter {
    title: String,
    unit: SizeUnit,
}

impl DocumentExporter {
    pub fn new(title: impl Into<String>, unit: SizeUnit) -> Self {
        Self {
            title: title.into(),
            unit,
        }
    }

    pub fn render(&self, records: &[FileRecord], generated: NaiveDateTime) -> String {
        let body_len: usize = records.iter().map(|r| r.content.len() + 64).sum();
        let mut doc = String::with_capacity(body_len + 128);

        doc.push_str(&format!("# Project Export: {}\n\n", self.title));
        doc.push_str(&format!("Generated: {}\n", generated.format(GENERATED_FORMAT)));
        doc.push_str(&format!("Total files: {}\n", records.len()));

        for record in records {
            let fence = fence_for(&record.content);
            doc.push_str(&format!("\n## File: {}\n\n", record.display_path));
            doc.push_str(&format!("{}{}\n", fence, record.fence_language()));
            doc.push_str(&record.content);
            doc.push('\n');
            doc.push_str(&fence);
            doc.push('\n');
            doc.push_str(&format!("\n*Metrics: {}*\n", record.metrics_string(self.unit)));
        }

        doc
    }
}

/// Backtick fence long enough not to collide with anything in `content`
pub fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in content.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    "`".repeat((longest + 1).max(3))
}
