// Regex fallback tier
//
// Line-oriented pattern matching. Shallow on purpose: no multi-line state,
// no brace balancing, no argument extraction.

use super::{Class, Function, ParseResult, ParserPlugin, REGEX_PRIORITY};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Compiled patterns for one language
struct PatternTable {
    functions: Vec<Regex>,
    classes: Vec<Regex>,
    imports: Vec<Regex>,
}

impl PatternTable {
    fn new(functions: &[&str], classes: &[&str], imports: &[&str]) -> Self {
        Self {
            functions: compile(functions),
            classes: compile(classes),
            imports: compile(imports),
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Invalid fallback pattern {:?}: {}", p, e);
                None
            }
        })
        .collect()
}

const C_FUNCTION: &str = r"^\s*(?:\w+\s+)*(\w+)\s*\([^)]*\)\s*(?:\{|;)";
const C_INCLUDE: &str = r#"#include\s*[<"]([^>"]+)[>"]"#;
const ES_IMPORT_FROM: &str = r#"import\s+.*\s+from\s+["']([^"']+)["']"#;
const ES_IMPORT_BARE: &str = r#"import\s+["']([^"']+)["']"#;

static TABLES: Lazy<HashMap<&'static str, PatternTable>> = Lazy::new(|| {
    let mut tables = HashMap::new();

    tables.insert(
        "javascript",
        PatternTable::new(
            &[
                r"function\s+(\w+)\s*\(",
                r"(\w+)\s*:\s*function\s*\(",
                r"(\w+)\s*=\s*function\s*\(",
                r"(\w+)\s*=\s*\([^)]*\)\s*=>",
                r"(?:const|let|var)\s+(\w+)\s*=\s*\([^)]*\)\s*=>",
            ],
            &[r"class\s+(\w+)"],
            &[
                ES_IMPORT_FROM,
                ES_IMPORT_BARE,
                r#"require\s*\(\s*["']([^"']+)["']\s*\)"#,
            ],
        ),
    );
    tables.insert(
        "typescript",
        PatternTable::new(
            &[
                r"function\s+(\w+)\s*\(",
                r"(\w+)\s*=\s*\([^)]*\)\s*=>",
                r"(?:const|let|var)\s+(\w+)\s*=\s*\([^)]*\)\s*=>",
            ],
            &[r"class\s+(\w+)", r"interface\s+(\w+)"],
            &[ES_IMPORT_FROM, ES_IMPORT_BARE],
        ),
    );
    tables.insert(
        "java",
        PatternTable::new(
            &[r"(?:public|private|protected)?\s*(?:static)?\s*\w+\s+(\w+)\s*\("],
            &[r"(?:public|private)?\s*(?:class|interface|enum)\s+(\w+)"],
            &[r"import\s+([^;]+);"],
        ),
    );
    tables.insert(
        "cpp",
        PatternTable::new(&[C_FUNCTION], &[r"class\s+(\w+)"], &[C_INCLUDE]),
    );
    tables.insert("c", PatternTable::new(&[C_FUNCTION], &[], &[C_INCLUDE]));
    tables.insert(
        "go",
        PatternTable::new(
            &[r"func\s+(?:\([^)]*\)\s+)?(\w+)\s*\("],
            &[r"type\s+(\w+)\s+(?:struct|interface)"],
            &[r#"import\s+(?:\(\s*)?"([^"]+)""#, r#"^"([^"]+)"$"#],
        ),
    );
    tables.insert(
        "rust",
        PatternTable::new(
            &[r"fn\s+(\w+)\s*[<(]"],
            &[r"(?:struct|enum|trait)\s+(\w+)"],
            &[r"use\s+([^;]+);"],
        ),
    );
    tables.insert(
        "python",
        PatternTable::new(
            &[r"^(?:async\s+)?def\s+(\w+)\s*\("],
            &[r"^class\s+(\w+)"],
            &[r"^import\s+([\w.]+)", r"^from\s+([\w.]+)\s+import\b"],
        ),
    );
    tables.insert(
        "ruby",
        PatternTable::new(
            &[r"^def\s+(?:self\.)?(\w+[?!]?)"],
            &[r"^(?:class|module)\s+([A-Z]\w*)"],
            &[r#"^require(?:_relative)?\s+["']([^"']+)["']"#],
        ),
    );
    tables.insert(
        "php",
        PatternTable::new(
            &[r"function\s+(\w+)\s*\("],
            &[r"^(?:abstract\s+|final\s+)?(?:class|interface|trait)\s+(\w+)"],
            &[r"^use\s+([^;]+);", r#"(?:require|include)(?:_once)?\s*\(?\s*["']([^"']+)["']"#],
        ),
    );
    tables.insert(
        "csharp",
        PatternTable::new(
            &[r"(?:public|private|protected|internal)\s+(?:static\s+)?(?:async\s+)?[\w<>\[\],]+\s+(\w+)\s*\("],
            &[r"(?:class|interface|struct|record)\s+(\w+)"],
            &[r"^using\s+([\w.]+)\s*;"],
        ),
    );
    tables.insert(
        "kotlin",
        PatternTable::new(
            &[r"fun\s+(?:<[^>]*>\s*)?(?:\w+\.)?(\w+)\s*\("],
            &[r"(?:class|interface|object)\s+(\w+)"],
            &[r"^import\s+([\w.*]+)"],
        ),
    );

    tables
});

/// Languages with a pattern table
#[cfg(test)]
fn regex_languages() -> Vec<&'static str> {
    let mut langs: Vec<_> = TABLES.keys().copied().collect();
    langs.sort_unstable();
    langs
}

/// Pattern-matching parser; lowest priority, always available
#[derive(Debug, Default)]
pub struct RegexParser;

impl RegexParser {
    pub fn new() -> Self {
        Self
    }
}

impl ParserPlugin for RegexParser {
    fn name(&self) -> &str {
        "regex-fallback"
    }

    fn priority(&self) -> u32 {
        REGEX_PRIORITY
    }

    fn supports(&self, language: &str) -> bool {
        TABLES.contains_key(language.to_ascii_lowercase().as_str())
    }

    fn parse(&mut self, content: &str, path: &Path, language: &str) -> ParseResult {
        let mut result = ParseResult::default();
        let Some(table) = TABLES.get(language.to_ascii_lowercase().as_str()) else {
            return result;
        };

        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            let line_no = idx + 1;

            if let Some(name) = first_capture(&table.functions, line) {
                result.functions.push(Function::new(name, path, line_no));
            }

            if let Some(name) = first_capture(&table.classes, line) {
                result.classes.push(Class::new(name, path, line_no));
            }

            for pattern in &table.imports {
                if let Some(target) = pattern.captures(line).and_then(|c| c.get(1)) {
                    result.imports.insert(target.as_str().trim().to_string());
                }
            }
        }

        result
    }
}

/// Group 1 of the first pattern that matches
fn first_capture<'a>(patterns: &[Regex], line: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|p| p.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, language: &str) -> ParseResult {
        RegexParser::new().parse(source, Path::new("sample"), language)
    }

    fn names(funcs: &[Function]) -> Vec<&str> {
        funcs.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        let raw_counts: &[(&str, usize)] = &[("javascript", 5), ("c", 1), ("python", 1)];
        for (lang, expected) in raw_counts {
            assert_eq!(TABLES[lang].functions.len(), *expected, "{}", lang);
        }
        assert_eq!(TABLES["javascript"].imports.len(), 3);
        assert_eq!(TABLES["php"].imports.len(), 2);
        assert_eq!(TABLES["csharp"].functions.len(), 1);
    }

    #[test]
    fn test_javascript_functions_and_imports() {
        let result = parse(
            "import React from 'react';\nfunction App() { return null; }\nconst helper = () => true;\nconst x = require(\"lodash\");\n",
            "javascript",
        );
        let found = names(&result.functions);
        assert!(found.contains(&"App"));
        assert!(found.contains(&"helper"));
        assert!(result.imports.contains("react"));
        assert!(result.imports.contains("lodash"));
    }

    #[test]
    fn test_python_scenario() {
        let result = parse(
            "import os\nfrom pkg.sub import thing\n\ndef hello():\n    return 'world'\n\nclass Greeter:\n    pass\n",
            "python",
        );
        assert_eq!(names(&result.functions), vec!["hello"]);
        assert_eq!(result.functions[0].line, 4);
        assert!(result.functions[0].args.is_empty());
        assert!(result.functions[0].docstring.is_none());
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.classes[0].name, "Greeter");
        assert_eq!(result.classes[0].line, 7);
        assert!(result.imports.contains("os"));
        assert!(result.imports.contains("pkg.sub"));
    }

    #[test]
    fn test_c_includes_and_functions() {
        let result = parse(
            "#include <stdio.h>\n#include \"util.h\"\nint main(int argc, char **argv) {\n    return 0;\n}\n",
            "c",
        );
        assert!(result.imports.contains("stdio.h"));
        assert!(result.imports.contains("util.h"));
        assert_eq!(names(&result.functions), vec!["main"]);
        assert!(result.classes.is_empty());
    }

    #[test]
    fn test_go_import_block() {
        let result = parse(
            "package main\n\nimport (\n\t\"fmt\"\n\t\"net/http\"\n)\n\ntype Server struct {\n}\n\nfunc (s *Server) Start() {\n}\n",
            "go",
        );
        assert!(result.imports.contains("fmt"));
        assert!(result.imports.contains("net/http"));
        assert_eq!(result.classes[0].name, "Server");
        assert_eq!(names(&result.functions), vec!["Start"]);
    }

    #[test]
    fn test_rust_patterns() {
        let result = parse(
            "use std::collections::HashMap;\npub struct Cache;\npub fn build<T>(x: T) {}\n",
            "rust",
        );
        assert!(result.imports.contains("std::collections::HashMap"));
        assert_eq!(result.classes[0].name, "Cache");
        assert_eq!(names(&result.functions), vec!["build"]);
    }

    #[test]
    fn test_first_function_pattern_wins_per_line() {
        // Matches both `(\w+)\s*=\s*function` and `function\s+(\w+)`; one record.
        let result = parse("var run = function go() {}", "javascript");
        assert_eq!(result.functions.len(), 1);
    }

    #[test]
    fn test_duplicate_imports_collapse() {
        let result = parse("import os\nimport os\n", "python");
        assert_eq!(result.imports.len(), 1);
    }

    #[test]
    fn test_unknown_language_is_empty() {
        let mut parser = RegexParser::new();
        assert!(!parser.supports("cobol"));
        let result = parser.parse("IDENTIFICATION DIVISION.", Path::new("a.cbl"), "cobol");
        assert!(result.is_empty());
    }

    #[test]
    fn test_supported_languages() {
        let langs = regex_languages();
        for lang in ["c", "cpp", "go", "java", "javascript", "python", "rust", "typescript"] {
            assert!(langs.contains(&lang), "missing {}", lang);
        }
    }
}
