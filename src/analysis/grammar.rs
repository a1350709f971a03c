//! Per-language node-kind tables for structural analysis

use tree_sitter::Language;

/// Node kinds that matter for counting and patching in one language
pub struct Grammar {
    pub name: &'static str,
    pub language: Language,
    /// Definitions counted as classes and eligible for patching
    pub class_kinds: &'static [&'static str],
    /// Function and method definitions
    pub function_kinds: &'static [&'static str],
    /// Function kinds that are always constructors
    pub constructor_kinds: &'static [&'static str],
    /// Function names that are constructors/initializers
    pub constructor_names: &'static [&'static str],
    /// A method named after its enclosing class is a constructor
    pub constructor_is_class_name: bool,
    /// Assignment and declaration nodes whose targets are counted as variables
    pub assignment_kinds: &'static [&'static str],
    /// Top-level wrappers that are looked through (decorators, exports, templates)
    pub wrapper_kinds: &'static [&'static str],
}

/// Fields that hold an assignment's target, tried in order
pub(crate) const TARGET_FIELDS: &[&str] = &["left", "target", "pattern", "name", "declarator"];

/// Target nodes that bind several names at once
pub(crate) const DESTRUCTURING_KINDS: &[&str] = &[
    "pattern_list",
    "tuple_pattern",
    "list_pattern",
    "expression_list",
    "tuple",
    "array_pattern",
    "object_pattern",
    "left_assignment_list",
];

impl Grammar {
    /// Grammar for a file extension, if one is linked in
    pub fn for_extension(extension: &str) -> Option<Self> {
        let grammar = match extension.trim_start_matches('.').to_lowercase().as_str() {
            "py" | "pyw" | "pyi" => Grammar {
                name: "Python",
                language: tree_sitter_python::LANGUAGE.into(),
                class_kinds: &["class_definition"],
                function_kinds: &["function_definition"],
                constructor_kinds: &[],
                constructor_names: &["__init__", "__new__"],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment", "augmented_assignment"],
                wrapper_kinds: &["decorated_definition"],
            },
            "rs" => Grammar {
                name: "Rust",
                language: tree_sitter_rust::LANGUAGE.into(),
                class_kinds: &["struct_item", "enum_item", "union_item", "trait_item"],
                function_kinds: &["function_item", "function_signature_item"],
                constructor_kinds: &[],
                constructor_names: &["new"],
                constructor_is_class_name: false,
                assignment_kinds: &[
                    "let_declaration",
                    "assignment_expression",
                    "compound_assignment_expr",
                ],
                wrapper_kinds: &[],
            },
            "js" | "mjs" | "cjs" | "jsx" => Grammar {
                name: "JavaScript",
                language: tree_sitter_javascript::LANGUAGE.into(),
                class_kinds: &["class_declaration"],
                function_kinds: JS_FUNCTION_KINDS,
                constructor_kinds: &[],
                constructor_names: &["constructor"],
                constructor_is_class_name: false,
                assignment_kinds: JS_ASSIGNMENT_KINDS,
                wrapper_kinds: &["export_statement"],
            },
            "ts" | "mts" | "cts" => Grammar {
                name: "TypeScript",
                language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                class_kinds: TS_CLASS_KINDS,
                function_kinds: JS_FUNCTION_KINDS,
                constructor_kinds: &[],
                constructor_names: &["constructor"],
                constructor_is_class_name: false,
                assignment_kinds: JS_ASSIGNMENT_KINDS,
                wrapper_kinds: &["export_statement"],
            },
            "tsx" => Grammar {
                name: "TSX",
                language: tree_sitter_typescript::LANGUAGE_TSX.into(),
                class_kinds: TS_CLASS_KINDS,
                function_kinds: JS_FUNCTION_KINDS,
                constructor_kinds: &[],
                constructor_names: &["constructor"],
                constructor_is_class_name: false,
                assignment_kinds: JS_ASSIGNMENT_KINDS,
                wrapper_kinds: &["export_statement"],
            },
            "go" => Grammar {
                name: "Go",
                language: tree_sitter_go::LANGUAGE.into(),
                class_kinds: &["type_declaration"],
                function_kinds: &["function_declaration", "method_declaration", "func_literal"],
                constructor_kinds: &[],
                constructor_names: &[],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment_statement", "short_var_declaration", "var_spec"],
                wrapper_kinds: &[],
            },
            "java" => Grammar {
                name: "Java",
                language: tree_sitter_java::LANGUAGE.into(),
                class_kinds: &[
                    "class_declaration",
                    "interface_declaration",
                    "enum_declaration",
                    "record_declaration",
                ],
                function_kinds: &["method_declaration", "constructor_declaration"],
                constructor_kinds: &["constructor_declaration"],
                constructor_names: &[],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment_expression", "variable_declarator"],
                wrapper_kinds: &[],
            },
            "swift" => Grammar {
                name: "Swift",
                language: tree_sitter_swift::LANGUAGE.into(),
                class_kinds: &["class_declaration", "protocol_declaration"],
                function_kinds: &["function_declaration", "init_declaration"],
                constructor_kinds: &["init_declaration"],
                constructor_names: &[],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment", "property_declaration"],
                wrapper_kinds: &[],
            },
            "c" | "h" => Grammar {
                name: "C",
                language: tree_sitter_c::LANGUAGE.into(),
                class_kinds: &["struct_specifier", "union_specifier", "enum_specifier"],
                function_kinds: &["function_definition"],
                constructor_kinds: &[],
                constructor_names: &[],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment_expression", "init_declarator"],
                wrapper_kinds: &["type_definition", "declaration"],
            },
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Grammar {
                name: "C++",
                language: tree_sitter_cpp::LANGUAGE.into(),
                class_kinds: &[
                    "class_specifier",
                    "struct_specifier",
                    "union_specifier",
                    "enum_specifier",
                ],
                function_kinds: &["function_definition"],
                constructor_kinds: &[],
                constructor_names: &[],
                constructor_is_class_name: true,
                assignment_kinds: &["assignment_expression", "init_declarator"],
                wrapper_kinds: &["template_declaration", "type_definition", "declaration"],
            },
            "cs" => Grammar {
                name: "C#",
                language: tree_sitter_c_sharp::LANGUAGE.into(),
                class_kinds: &[
                    "class_declaration",
                    "struct_declaration",
                    "interface_declaration",
                    "enum_declaration",
                    "record_declaration",
                ],
                function_kinds: &[
                    "method_declaration",
                    "constructor_declaration",
                    "local_function_statement",
                ],
                constructor_kinds: &["constructor_declaration"],
                constructor_names: &[],
                constructor_is_class_name: true,
                assignment_kinds: &["assignment_expression", "variable_declarator"],
                wrapper_kinds: &[],
            },
            "rb" => Grammar {
                name: "Ruby",
                language: tree_sitter_ruby::LANGUAGE.into(),
                class_kinds: &["class", "module"],
                function_kinds: &["method", "singleton_method"],
                constructor_kinds: &[],
                constructor_names: &["initialize"],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment", "operator_assignment"],
                wrapper_kinds: &[],
            },
            "php" => Grammar {
                name: "PHP",
                language: tree_sitter_php::LANGUAGE_PHP.into(),
                class_kinds: &[
                    "class_declaration",
                    "interface_declaration",
                    "trait_declaration",
                    "enum_declaration",
                ],
                function_kinds: &["function_definition", "method_declaration"],
                constructor_kinds: &[],
                constructor_names: &["__construct"],
                constructor_is_class_name: false,
                assignment_kinds: &["assignment_expression", "augmented_assignment_expression"],
                wrapper_kinds: &[],
            },
            _ => return None,
        };

        Some(grammar)
    }

    pub fn is_class(&self, kind: &str) -> bool {
        self.class_kinds.contains(&kind)
    }

    pub fn is_function(&self, kind: &str) -> bool {
        self.function_kinds.contains(&kind)
    }

    pub fn is_assignment(&self, kind: &str) -> bool {
        self.assignment_kinds.contains(&kind)
    }

    pub fn is_wrapper(&self, kind: &str) -> bool {
        self.wrapper_kinds.contains(&kind)
    }
}

const JS_FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "arrow_function",
    "method_definition",
];

const JS_ASSIGNMENT_KINDS: &[&str] = &[
    "assignment_expression",
    "augmented_assignment_expression",
    "variable_declarator",
];

const TS_CLASS_KINDS: &[&str] = &["class_declaration", "abstract_class_declaration"];
