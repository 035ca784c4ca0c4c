//! Tree-sitter based parser tier.
//!
//! One plugin covers every language with a bundled grammar. A per-language
//! [`NodeKinds`] table says which node kinds are functions, classes and
//! imports; the tree is walked in pre-order and matching nodes are recorded.
//!
//! The grammars are compiled in only with the `tree-sitter` feature. Without
//! it the plugin still exists but supports nothing, so the registry falls
//! through to the regex tier.

use super::{ParseResult, ParserPlugin, TREE_SITTER_PRIORITY};
use std::path::Path;

/// Languages this tier will attempt
pub const TREE_SITTER_LANGUAGES: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "java",
    "c",
    "cpp",
    "go",
    "rust",
];

/// Node kinds that map to structural records for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKinds {
    pub functions: &'static [&'static str],
    pub classes: &'static [&'static str],
    pub imports: &'static [&'static str],
}

const ES_KINDS: NodeKinds = NodeKinds {
    functions: &["function_declaration", "method_definition", "arrow_function"],
    classes: &["class_declaration"],
    imports: &["import_statement"],
};

impl NodeKinds {
    /// Node kind table for `language`, if this tier handles it
    pub fn for_language(language: &str) -> Option<NodeKinds> {
        let kinds = match language {
            "python" => NodeKinds {
                functions: &["function_definition"],
                classes: &["class_definition"],
                imports: &["import_statement", "import_from_statement"],
            },
            "javascript" | "typescript" => ES_KINDS,
            "java" => NodeKinds {
                functions: &["method_declaration", "constructor_declaration"],
                classes: &[
                    "class_declaration",
                    "interface_declaration",
                    "enum_declaration",
                ],
                imports: &["import_declaration"],
            },
            "c" => NodeKinds {
                functions: &["function_definition"],
                classes: &[],
                imports: &["preproc_include"],
            },
            "cpp" => NodeKinds {
                functions: &["function_definition"],
                classes: &["class_specifier", "struct_specifier"],
                imports: &["preproc_include"],
            },
            "go" => NodeKinds {
                functions: &["function_declaration", "method_declaration"],
                classes: &["type_spec"],
                imports: &["import_spec"],
            },
            "rust" => NodeKinds {
                functions: &["function_item"],
                classes: &["struct_item", "enum_item", "trait_item"],
                imports: &["use_declaration"],
            },
            _ => return None,
        };
        Some(kinds)
    }

    /// Whether the language's C-family declarators hide the name
    #[cfg(any(test, feature = "tree-sitter"))]
    fn uses_declarators(language: &str) -> bool {
        matches!(language, "c" | "cpp")
    }
}

/// Parser plugin backed by tree-sitter grammars
pub struct TreeSitterParser {
    backend: backend::Backend,
}

impl TreeSitterParser {
    /// Create the plugin, probing every bundled grammar
    pub fn new() -> Self {
        Self {
            backend: backend::Backend::load(),
        }
    }

    /// Languages whose grammar loaded
    pub fn available_languages(&self) -> Vec<&'static str> {
        TREE_SITTER_LANGUAGES
            .iter()
            .copied()
            .filter(|lang| self.backend.has(lang))
            .collect()
    }
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeSitterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterParser")
            .field("languages", &self.available_languages())
            .finish()
    }
}

impl ParserPlugin for TreeSitterParser {
    fn name(&self) -> &str {
        "tree-sitter"
    }

    fn priority(&self) -> u32 {
        TREE_SITTER_PRIORITY
    }

    fn supports(&self, language: &str) -> bool {
        self.backend.has(language)
    }

    fn parse(&mut self, content: &str, path: &Path, language: &str) -> ParseResult {
        match NodeKinds::for_language(language) {
            Some(kinds) => self.backend.parse(content, path, language, &kinds),
            None => ParseResult::default(),
        }
    }
}

#[cfg(feature = "tree-sitter")]
mod backend {
    use super::NodeKinds;
    use crate::parser::{Class, Function, ParseResult};
    use std::collections::HashMap;
    use std::path::Path;
    use tree_sitter::{Language, Node, Parser};

    fn grammar(language: &str) -> Option<Language> {
        let lang = match language {
            "python" => tree_sitter_python::language(),
            "javascript" => tree_sitter_javascript::language(),
            "typescript" => tree_sitter_typescript::language_typescript(),
            "java" => tree_sitter_java::language(),
            "c" => tree_sitter_c::language(),
            "cpp" => tree_sitter_cpp::language(),
            "go" => tree_sitter_go::language(),
            "rust" => tree_sitter_rust::language(),
            _ => return None,
        };
        Some(lang)
    }

    pub struct Backend {
        parser: Parser,
        grammars: HashMap<&'static str, Language>,
    }

    impl Backend {
        pub fn load() -> Self {
            let mut parser = Parser::new();
            let mut grammars = HashMap::new();

            for &name in super::TREE_SITTER_LANGUAGES {
                let Some(lang) = grammar(name) else { continue };
                match parser.set_language(&lang) {
                    Ok(()) => {
                        grammars.insert(name, lang);
                    }
                    Err(e) => tracing::warn!("Tree-sitter grammar for {} unavailable: {}", name, e),
                }
            }

            Self { parser, grammars }
        }

        pub fn has(&self, language: &str) -> bool {
            self.grammars.contains_key(language)
        }

        pub fn parse(
            &mut self,
            content: &str,
            path: &Path,
            language: &str,
            kinds: &NodeKinds,
        ) -> ParseResult {
            let mut result = ParseResult::default();
            let Some(lang) = self.grammars.get(language) else {
                return result;
            };
            if let Err(e) = self.parser.set_language(lang) {
                tracing::debug!("Cannot load {} grammar: {}", language, e);
                return result;
            }
            let Some(tree) = self.parser.parse(content, None) else {
                tracing::debug!("Tree-sitter produced no tree for {}", path.display());
                return result;
            };

            let source = content.as_bytes();
            let declarators = NodeKinds::uses_declarators(language);

            for node in preorder(tree.root_node()) {
                let kind = node.kind();
                let line = node.start_position().row + 1;

                if kinds.functions.contains(&kind) {
                    if let Some(name) = node_name(node, source, declarators) {
                        result.functions.push(Function::new(name, path, line));
                    }
                } else if kinds.classes.contains(&kind) {
                    if let Some(name) = node_name(node, source, false) {
                        result.classes.push(Class::new(name, path, line));
                    }
                } else if kinds.imports.contains(&kind) {
                    if let Ok(text) = node.utf8_text(source) {
                        result.imports.insert(text.trim().to_string());
                    }
                }
            }

            result
        }
    }

    /// All nodes of the tree in pre-order
    fn preorder(root: Node<'_>) -> Vec<Node<'_>> {
        let mut nodes = Vec::new();
        let mut cursor = root.walk();

        loop {
            nodes.push(cursor.node());
            if cursor.goto_first_child() || cursor.goto_next_sibling() {
                continue;
            }
            loop {
                if !cursor.goto_parent() {
                    return nodes;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    /// The node's name, from its `name` field or its declarator chain.
    ///
    /// Zero-width names come from error recovery and count as missing.
    fn node_name<'s>(node: Node<'_>, source: &'s [u8], declarators: bool) -> Option<&'s str> {
        raw_name(node, source, declarators).filter(|name| !name.is_empty())
    }

    fn raw_name<'s>(node: Node<'_>, source: &'s [u8], declarators: bool) -> Option<&'s str> {
        if let Some(name) = node.child_by_field_name("name") {
            return name.utf8_text(source).ok();
        }
        if !declarators {
            return None;
        }

        let mut current = node.child_by_field_name("declarator")?;
        while let Some(inner) = current.child_by_field_name("declarator") {
            current = inner;
        }
        if let Some(name) = current.child_by_field_name("name") {
            return name.utf8_text(source).ok();
        }
        if current.kind().ends_with("identifier") {
            return current.utf8_text(source).ok();
        }
        None
    }
}

#[cfg(not(feature = "tree-sitter"))]
mod backend {
    use super::NodeKinds;
    use crate::parser::ParseResult;
    use std::path::Path;

    pub struct Backend;

    impl Backend {
        pub fn load() -> Self {
            tracing::debug!("Built without tree-sitter grammars");
            Self
        }

        pub fn has(&self, _language: &str) -> bool {
            false
        }

        pub fn parse(
            &mut self,
            _content: &str,
            _path: &Path,
            _language: &str,
            _kinds: &NodeKinds,
        ) -> ParseResult {
            ParseResult::default()
        }
    }
}
