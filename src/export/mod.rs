//! Forward direction: file records to a single artifact

pub mod document;
pub mod tabular;

pub use document::{DocumentExporter, fence_for};
pub use tabular::{HEADERS, TabularExporter};

use chrono::NaiveDateTime;

/// Timestamp layout used in artifact names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<prefix>_<YYYYMMDD_HHMMSS>.<extension>`
pub fn artifact_file_name(prefix: &str, extension: &str, generated: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        generated.format(FILE_TIMESTAMP_FORMAT),
        extension
    )
}

/// Whether `name` has the shape [`artifact_file_name`] gives `prefix` and `extension`
pub fn is_artifact_file_name(name: &str, prefix: &str, extension: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(extension))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, FILE_TIMESTAMP_FORMAT).is_ok())
}
