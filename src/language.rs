//! File extension to language tag mapping.

use phf::phf_map;
use std::path::Path;

/// Lower-cased extension (without the dot) to language tag
static EXTENSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "py" => "python",
    "pyi" => "python",
    "js" => "javascript",
    "jsx" => "javascript",
    "mjs" => "javascript",
    "cjs" => "javascript",
    "ts" => "typescript",
    "tsx" => "typescript",
    "java" => "java",
    "cpp" => "cpp",
    "cxx" => "cpp",
    "cc" => "cpp",
    "hpp" => "cpp",
    "hh" => "cpp",
    "c" => "c",
    "h" => "c",
    "go" => "go",
    "rs" => "rust",
    "php" => "php",
    "rb" => "ruby",
    "swift" => "swift",
    "kt" => "kotlin",
    "kts" => "kotlin",
    "scala" => "scala",
    "cs" => "csharp",
    "sh" => "shell",
    "bash" => "shell",
    "zsh" => "shell",
    "fish" => "shell",
    "r" => "r",
    "sql" => "sql",
    "html" => "html",
    "htm" => "html",
    "css" => "css",
    "scss" => "scss",
    "sass" => "sass",
    "less" => "less",
    "xml" => "xml",
    "yaml" => "yaml",
    "yml" => "yaml",
    "json" => "json",
    "toml" => "toml",
    "ini" => "ini",
    "cfg" => "ini",
    "conf" => "ini",
    "md" => "markdown",
    "markdown" => "markdown",
    "rst" => "rst",
    "txt" => "text",
};

/// Extension-less files recognized by exact name
static FILE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "Dockerfile" => "dockerfile",
    "Makefile" => "makefile",
    "GNUmakefile" => "makefile",
};

/// Languages whose files are web front-end assets
pub const WEB_LANGUAGES: &[&str] = &["html", "css", "javascript"];

/// Detect the language of a file from its name.
///
/// Returns `None` for unrecognized files; the analyzer skips those.
pub fn detect_language(path: &Path) -> Option<&'static str> {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if let Some(lang) = FILE_NAMES.get(name) {
            return Some(*lang);
        }
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS.get(ext.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_source_extensions() {
        assert_eq!(detect_language(Path::new("main.py")), Some("python"));
        assert_eq!(detect_language(Path::new("src/app.tsx")), Some("typescript"));
        assert_eq!(detect_language(Path::new("lib.rs")), Some("rust"));
        assert_eq!(detect_language(Path::new("a/b/c.h")), Some("c"));
        assert_eq!(detect_language(Path::new("x.hpp")), Some("cpp"));
        assert_eq!(detect_language(Path::new("main.go")), Some("go"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(detect_language(Path::new("Script.PY")), Some("python"));
        assert_eq!(detect_language(Path::new("analysis.R")), Some("r"));
    }

    #[test]
    fn test_markup_and_config() {
        assert_eq!(detect_language(Path::new("index.html")), Some("html"));
        assert_eq!(detect_language(Path::new("package.json")), Some("json"));
        assert_eq!(detect_language(Path::new("Cargo.toml")), Some("toml"));
        assert_eq!(detect_language(Path::new("README.md")), Some("markdown"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(detect_language(Path::new("Dockerfile")), Some("dockerfile"));
        assert_eq!(detect_language(Path::new("build/Makefile")), Some("makefile"));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(detect_language(Path::new("binary.dat")), None);
        assert_eq!(detect_language(Path::new("LICENSE")), None);
        assert_eq!(detect_language(Path::new(".gitignore")), None);
    }
}
