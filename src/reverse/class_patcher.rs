//! In-place replacement of one top-level class
//!
//! The replaced span runs from the class definition to the start of the line
//! holding the next top-level node (or end of file).
//! Blank lines at the end of that span are kept after the new text.

use crate::analysis::{AstParser, TopLevelItem};
use crate::error::WriteError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Replace the first top-level class named `class_name` in `file_path`.
///
/// Returns `Ok(false)` and leaves the file untouched when the file does not
/// exist, its language has no grammar, or no such class is defined.
pub fn update_class_in_file(
    file_path: &Path,
    class_name: &str,
    new_content: &str,
) -> Result<bool, WriteError> {
    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Cannot patch {:?}: file does not exist", file_path);
            return Ok(false);
        }
        Err(e) => return Err(patch_failed(file_path, e)),
    };

    let Some(mut parser) = AstParser::for_path(file_path) else {
        tracing::debug!("Cannot patch {:?}: no grammar for this file type", file_path);
        return Ok(false);
    };

    let items = parser
        .top_level_items(&source)
        .map_err(|e| patch_failed(file_path, format!("{:#}", e)))?;

    let Some(patched) = replace_class(&source, &items, class_name, new_content) else {
        tracing::debug!("Class {} not found in {:?}", class_name, file_path);
        return Ok(false);
    };

    fs::write(file_path, patched).map_err(|e| patch_failed(file_path, e))?;
    tracing::info!("Patched class {} in {:?}", class_name, file_path);
    Ok(true)
}

/// Source with the class span swapped for `new_content`, or `None` if the
/// class is not defined at top level
fn replace_class(
    source: &str,
    items: &[TopLevelItem],
    class_name: &str,
    new_content: &str,
) -> Option<String> {
    let index = items
        .iter()
        .position(|item| item.class_name.as_deref() == Some(class_name))?;
    let target = &items[index];

    // Wrapper text on the class line (`export `) and wrapper lines above it
    // (decorators) stay in place
    let class_line = line_start(source, target.class_start_byte);
    let start = if class_line <= target.start_byte {
        target.class_start_byte
    } else {
        class_line
    };
    let end = match items.get(index + 1) {
        Some(next) => {
            let next_line = line_start(source, next.start_byte);
            if next_line < target.class_end_byte {
                target.class_end_byte
            } else {
                next_line
            }
        }
        None => source.len(),
    };

    let span = &source[start..end];
    let text_end = span.trim_end().len();
    let tail_start = span[text_end..]
        .find('\n')
        .map_or(span.len(), |i| text_end + i + 1);
    let tail = &span[tail_start..];

    let mut patched = String::with_capacity(source.len() + new_content.len());
    patched.push_str(&source[..start]);
    patched.push_str(new_content);
    if span.ends_with('\n') && !new_content.ends_with('\n') {
        patched.push('\n');
    }
    patched.push_str(tail);
    patched.push_str(&source[end..]);
    Some(patched)
}

/// Byte offset of the start of the line containing `offset`
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn patch_failed(path: &Path, reason: impl ToString) -> WriteError {
    WriteError::PatchFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORIGINAL: &str = r#"import os


class TestClass:
    def old_method(self):
        return "old"


class OtherClass:
    def keep(self):
        return "kept"


def main():
    pass
"#;

    const REPLACEMENT: &str = r#"class TestClass:
    def new_method(self):
        return "new""#;

    fn write_fixture(name: &str, content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_patch_replaces_only_target_class() {
        let (_dir, path) = write_fixture("models.py", ORIGINAL);

        assert!(update_class_in_file(&path, "TestClass", REPLACEMENT).unwrap());

        let patched = fs::read_to_string(&path).unwrap();
        assert!(patched.contains("def new_method(self):"));
        assert!(!patched.contains("old_method"));
        assert!(patched.contains("class OtherClass:\n    def keep(self):\n        return \"kept\"\n"));
        assert!(patched.starts_with("import os\n\n\nclass TestClass:\n"));
        assert!(patched.ends_with("def main():\n    pass\n"));
    }

    #[test]
    fn test_patch_keeps_spacing_before_next_item() {
        let (_dir, path) = write_fixture("models.py", ORIGINAL);
        update_class_in_file(&path, "TestClass", REPLACEMENT).unwrap();

        let patched = fs::read_to_string(&path).unwrap();
        assert!(patched.contains("return \"new\"\n\n\nclass OtherClass:"));
    }

    #[test]
    fn test_patch_last_class_in_file() {
        let source = "x = 1\n\nclass Last:\n    a = 1\n";
        let (_dir, path) = write_fixture("last.py", source);

        assert!(update_class_in_file(&path, "Last", "class Last:\n    a = 2\n").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "x = 1\n\nclass Last:\n    a = 2\n"
        );
    }

    #[test]
    fn test_decorators_are_kept() {
        let source = "@register\nclass Model:\n    x = 1\n\nclass Other:\n    pass\n";
        let (_dir, path) = write_fixture("deco.py", source);

        update_class_in_file(&path, "Model", "class Model:\n    x = 2").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "@register\nclass Model:\n    x = 2\n\nclass Other:\n    pass\n"
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let source = "class Dup:\n    n = 1\n\nclass Dup:\n    n = 2\n";
        let (_dir, path) = write_fixture("dup.py", source);

        update_class_in_file(&path, "Dup", "class Dup:\n    n = 0\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "class Dup:\n    n = 0\n\nclass Dup:\n    n = 2\n"
        );
    }

    #[test]
    fn test_class_not_found_leaves_file_unchanged() {
        let (_dir, path) = write_fixture("models.py", ORIGINAL);

        assert!(!update_class_in_file(&path, "Missing", REPLACEMENT).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), ORIGINAL);
    }

    #[test]
    fn test_nested_class_is_not_a_target() {
        let source = "class Outer:\n    class Inner:\n        pass\n";
        let (_dir, path) = write_fixture("nested.py", source);

        assert!(!update_class_in_file(&path, "Inner", "class Inner: pass\n").unwrap());
    }

    #[test]
    fn test_missing_file_and_unsupported_language() {
        let dir = TempDir::new().unwrap();
        assert!(!update_class_in_file(&dir.path().join("absent.py"), "A", "").unwrap());

        let (_dir, path) = write_fixture("notes.txt", "class A:\n    pass\n");
        assert!(!update_class_in_file(&path, "A", "class A: pass").unwrap());
    }

    #[test]
    fn test_patch_javascript_exported_class() {
        let source = "export class Widget {\n  render() { return 1; }\n}\n\nexport function helper() {}\n";
        let (_dir, path) = write_fixture("widget.js", source);

        let replacement = "class Widget {\n  render() { return 2; }\n}\n";
        assert!(update_class_in_file(&path, "Widget", replacement).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export class Widget {\n  render() { return 2; }\n}\n\nexport function helper() {}\n"
        );
    }
}
