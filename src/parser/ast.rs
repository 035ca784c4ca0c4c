// Structural records extracted from source files
//
// These types are language-agnostic: every parser tier produces them, the
// cache stores them as JSON, and the renderers read them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The structure extracted from exactly one file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseResult {
    /// Top-level functions (not methods)
    pub functions: Vec<Function>,
    /// Classes, each carrying its own methods
    pub classes: Vec<Class>,
    /// Import/include targets; the format is language-specific
    pub imports: BTreeSet<String>,
}

impl ParseResult {
    /// Check if nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.imports.is_empty()
    }
}

/// A function definition. Methods use the same shape and live inside a [`Class`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Defining file, relative to the analyzed root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Docstring or leading doc comment
    pub docstring: Option<String>,
    /// Parameter names in declaration order
    #[serde(default)]
    pub args: Vec<String>,
    /// Decorators / attributes as written
    #[serde(default)]
    pub decorators: Vec<String>,
    #[serde(default)]
    pub is_async: bool,
}

/// A method is a [`Function`] contained in a [`Class`]
pub type Method = Function;

impl Function {
    pub fn new(name: &str, file: &Path, line: usize) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_path_buf(),
            line,
            docstring: None,
            args: Vec::new(),
            decorators: Vec::new(),
            is_async: false,
        }
    }

    /// Public API: the name does not start with `_` (dunders included)
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    /// First line of the docstring, if any
    pub fn summary(&self) -> Option<&str> {
        first_line(self.docstring.as_deref())
    }

    /// Get the function signature as a string
    pub fn signature(&self) -> String {
        let prefix = if self.is_async { "async " } else { "" };
        format!("{}{}({})", prefix, self.name, self.args.join(", "))
    }
}

/// A class, struct, trait or other type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    /// Class name
    pub name: String,
    /// Defining file, relative to the analyzed root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Class docstring
    pub docstring: Option<String>,
    /// Base types (as written, not resolved)
    #[serde(default)]
    pub bases: Vec<String>,
    /// Decorators applied to the class
    #[serde(default)]
    pub decorators: Vec<String>,
    /// Methods in source order
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Class {
    pub fn new(name: &str, file: &Path, line: usize) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_path_buf(),
            line,
            docstring: None,
            bases: Vec::new(),
            decorators: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    /// Methods that pass [`Function::is_public`]
    pub fn public_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| m.is_public())
    }

    /// First line of the docstring, if any
    pub fn summary(&self) -> Option<&str> {
        first_line(self.docstring.as_deref())
    }
}

fn first_line(doc: Option<&str>) -> Option<&str> {
    doc.and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
}
