use super::grammar::{DESTRUCTURING_KINDS, Grammar, TARGET_FIELDS};
use anyhow::{Context, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Class, function and variable counts for one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StructureCounts {
    /// Top-level class definitions
    pub class_count: usize,
    /// Functions and methods, constructors excluded
    pub function_count: usize,
    /// Assignment targets inside function and class bodies
    pub variable_count: usize,
}

/// One top-level node of a parsed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelItem {
    pub kind: String,
    /// Class name when the statement is (or wraps) a class definition
    pub class_name: Option<String>,
    /// Span of the statement including any wrapper (decorators, `export`)
    pub start_byte: usize,
    pub end_byte: usize,
    /// Span of the class node itself, without wrappers
    pub class_start_byte: usize,
    pub class_end_byte: usize,
}

/// AST parser for structural metrics and top-level statement spans
pub struct AstParser {
    parser: Parser,
    grammar: Grammar,
}

impl AstParser {
    /// Create a new AST parser for the given extension
    pub fn new(extension: &str) -> Result<Self> {
        let grammar = Grammar::for_extension(extension).with_context(|| {
            format!("Unsupported language for AST parsing: {}", extension)
        })?;

        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language)
            .context("Failed to set parser language")?;

        Ok(Self { parser, grammar })
    }

    /// Parser for a path's extension, or `None` when no grammar is linked
    pub fn for_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Grammar::for_extension(extension)?;
        match Self::new(extension) {
            Ok(parser) => Some(parser),
            Err(e) => {
                tracing::warn!("Failed to initialise parser for {:?}: {:#}", path, e);
                None
            }
        }
    }

    /// Get the language name
    pub fn language_name(&self) -> &str {
        self.grammar.name
    }

    fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .context("Failed to parse source code")
    }

    /// Count classes, functions and variables
    pub fn structure_counts(&mut self, source: &str) -> Result<StructureCounts> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut counts = StructureCounts::default();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let node = self.unwrap_wrappers(child);
            if self.grammar.is_class(node.kind()) {
                counts.class_count += 1;
            }
        }

        self.count_nested(root, bytes, None, false, &mut counts);
        Ok(counts)
    }

    /// Top-level nodes in source order, comments included
    pub fn top_level_items(&mut self, source: &str) -> Result<Vec<TopLevelItem>> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut items = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let inner = self.unwrap_wrappers(child);
            let class_name = if self.grammar.is_class(inner.kind()) {
                node_name(inner, bytes)
            } else {
                None
            };

            items.push(TopLevelItem {
                kind: inner.kind().to_string(),
                class_name,
                start_byte: child.start_byte(),
                end_byte: child.end_byte(),
                class_start_byte: inner.start_byte(),
                class_end_byte: inner.end_byte(),
            });
        }

        Ok(items)
    }

    fn unwrap_wrappers<'t>(&self, mut node: Node<'t>) -> Node<'t> {
        while self.grammar.is_wrapper(node.kind()) {
            let inner = ["definition", "declaration", "type"]
                .iter()
                .find_map(|field| node.child_by_field_name(field))
                .or_else(|| {
                    let count = node.named_child_count();
                    count.checked_sub(1).and_then(|last| node.named_child(last))
                });
            match inner {
                Some(inner) => node = inner,
                None => break,
            }
        }
        node
    }

    fn count_nested(
        &self,
        node: Node,
        bytes: &[u8],
        enclosing_class: Option<&str>,
        in_scope: bool,
        counts: &mut StructureCounts,
    ) {
        let kind = node.kind();
        let mut class_name = enclosing_class.map(str::to_string);
        let mut in_scope = in_scope;

        if self.grammar.is_class(kind) {
            class_name = node_name(node, bytes);
            in_scope = true;
        } else if self.grammar.is_function(kind) {
            if !self.is_constructor(node, bytes, enclosing_class) {
                counts.function_count += 1;
            }
            in_scope = true;
        } else if in_scope && self.grammar.is_assignment(kind) {
            counts.variable_count += count_targets(node);
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.count_nested(child, bytes, class_name.as_deref(), in_scope, counts);
        }
    }

    fn is_constructor(&self, node: Node, bytes: &[u8], enclosing_class: Option<&str>) -> bool {
        if self.grammar.constructor_kinds.contains(&node.kind()) {
            return true;
        }

        let Some(name) = node_name(node, bytes) else {
            return false;
        };

        if self.grammar.constructor_names.contains(&name.as_str()) {
            return true;
        }

        self.grammar.constructor_is_class_name && enclosing_class == Some(name.as_str())
    }
}

/// Name of a definition: its `name` field, or the identifier at the bottom
/// of a C-style declarator chain
fn node_name(node: Node, bytes: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return name.utf8_text(bytes).ok().map(str::to_string);
    }

    if let Some(declarator) = node.child_by_field_name("declarator") {
        return match declarator.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "destructor_name" => {
                declarator.utf8_text(bytes).ok().map(str::to_string)
            }
            _ => node_name(declarator, bytes),
        };
    }

    // Go type declarations keep the name on the inner type_spec
    let mut cursor = node.walk();
    let spec = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "type_spec");
    spec.and_then(|spec| node_name(spec, bytes))
}

/// Number of names bound by an assignment node
fn count_targets(node: Node) -> usize {
    let target = TARGET_FIELDS
        .iter()
        .find_map(|field| node.child_by_field_name(field));

    match target {
        Some(target) if DESTRUCTURING_KINDS.contains(&target.kind()) => {
            target.named_child_count().max(1)
        }
        Some(_) => 1,
        // Grammars without target fields still bind at least one name
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON_SAMPLE: &str = r#"
class TestClass:
    def __init__(self):
        self.value = 42

    def test_method(self):
        x = 10
        return x + self.value

def standalone_function():
    pass
"#;

    #[test]
    fn test_python_structure_counts() {
        let mut parser = AstParser::new("py").unwrap();
        let counts = parser.structure_counts(PYTHON_SAMPLE).unwrap();

        assert_eq!(counts.class_count, 1);
        // __init__ is excluded
        assert_eq!(counts.function_count, 2);
        assert!(counts.variable_count >= 2);
    }

    #[test]
    fn test_python_nested_class_not_top_level() {
        let source = "class Outer:\n    class Inner:\n        pass\n";
        let mut parser = AstParser::new("py").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.class_count, 1);
    }

    #[test]
    fn test_python_decorated_class_counts() {
        let source = "@dataclass\nclass Point:\n    x: int = 0\n";
        let mut parser = AstParser::new("py").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.class_count, 1);
    }

    #[test]
    fn test_python_tuple_assignment() {
        let source = "def f():\n    a, b = 1, 2\n";
        let mut parser = AstParser::new("py").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.variable_count, 2);
    }

    #[test]
    fn test_module_level_assignments_not_counted() {
        let source = "LIMIT = 10\n\ndef f():\n    return LIMIT\n";
        let mut parser = AstParser::new("py").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.variable_count, 0);
        assert_eq!(counts.function_count, 1);
    }

    #[test]
    fn test_javascript_constructor_excluded() {
        let source = r#"
class MyClass {
    constructor() {
        this.value = 0;
    }

    method() {
        return this.value;
    }
}
"#;
        let mut parser = AstParser::new("js").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.class_count, 1);
        assert_eq!(counts.function_count, 1);
        assert_eq!(counts.variable_count, 1);
    }

    #[test]
    fn test_rust_structs_and_functions() {
        let source = r#"
struct MyStruct {
    field: i32,
}

impl MyStruct {
    fn new() -> Self {
        MyStruct { field: 0 }
    }

    fn double(&self) -> i32 {
        let twice = self.field * 2;
        twice
    }
}
"#;
        let mut parser = AstParser::new("rs").unwrap();
        let counts = parser.structure_counts(source).unwrap();
        assert_eq!(counts.class_count, 1);
        assert_eq!(counts.function_count, 1);
        assert_eq!(counts.variable_count, 1);
    }

    #[test]
    fn test_top_level_items_python() {
        let source = "import os\n\n# helper\nclass A:\n    pass\n\nclass B:\n    pass\n";
        let mut parser = AstParser::new("py").unwrap();
        let items = parser.top_level_items(source).unwrap();

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].class_name, None);
        assert_eq!(items[1].kind, "comment");
        assert_eq!(items[2].class_name.as_deref(), Some("A"));
        assert_eq!(items[3].class_name.as_deref(), Some("B"));
    }

    #[test]
    fn test_unsupported_language() {
        assert!(AstParser::new("xyz").is_err());
        assert!(AstParser::for_path(Path::new("notes.txt")).is_none());
    }

    #[test]
    fn test_language_name() {
        let parser = AstParser::for_path(Path::new("main.go")).unwrap();
        assert_eq!(parser.language_name(), "Go");
    }
}
