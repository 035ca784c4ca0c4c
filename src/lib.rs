//! DocGenie - Analyze codebases and generate documentation
//!
//! Walks a project, extracts functions, classes and imports from every
//! supported source file through a tiered parser registry, caches parses by
//! content hash, and renders README, HTML and JSON reports.

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod ignore;
pub mod language;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{analyze, AnalysisResult, Analyzer};
pub use config::Config;
pub use error::{Error, Result};
