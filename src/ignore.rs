//! Glob-based path exclusion.
//!
//! A pattern excludes a path when it matches the whole path, the basename,
//! or any single path segment, so `node_modules` excludes
//! `web/node_modules/react/index.js` without any wildcard.

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Component, Path};

/// Patterns that are always applied
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    ".docgenie",
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    "node_modules",
    "bower_components",
    ".venv",
    "venv",
    "env",
    ".env",
    "build",
    "dist",
    "target",
    "out",
    ".idea",
    ".vscode",
    "*.swp",
    "*.swo",
    "*.log",
    "*.tmp",
    "*.temp",
    ".DS_Store",
    "Thumbs.db",
    "*.min.js",
    "*.min.css",
    "coverage",
    ".coverage",
    ".nyc_output",
    ".pytest_cache",
    ".tox",
    "*.egg-info",
    ".eggs",
];

/// Compiled set of ignore patterns (defaults plus caller extras)
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// Build a filter from the defaults and `extra` patterns.
    ///
    /// Patterns that do not compile are dropped with a warning.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Self {
        let patterns = DEFAULT_IGNORE_PATTERNS
            .iter()
            .copied()
            .chain(extra.iter().map(AsRef::as_ref))
            .filter_map(|raw| match compile_pattern(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Skipping ignore pattern: {}", e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Number of active patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether `path` should be excluded from analysis
    pub fn is_ignored(&self, path: &Path) -> bool {
        let full = path.to_string_lossy();
        let basename = path.file_name().map(|n| n.to_string_lossy());
        let segments: Vec<_> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();

        self.patterns.iter().any(|pattern| {
            pattern.matches(&full)
                || basename.as_deref().map_or(false, |b| pattern.matches(b))
                || segments.iter().any(|s| pattern.matches(s))
        })
    }
}

/// Compile one ignore pattern
pub fn compile_pattern(raw: &str) -> Result<Pattern> {
    Pattern::new(raw).map_err(|e| Error::glob_pattern(raw, e))
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}
