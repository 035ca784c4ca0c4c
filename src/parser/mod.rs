// Parser tiers for extracting structure from source files
//
// Every tier implements `ParserPlugin`. The registry orders them by priority
// and hands each language to the first tier that supports it.

pub mod ast;
mod fallback;
mod native;
mod registry;
mod treesitter;

pub use ast::*;
pub use fallback::RegexParser;
pub use native::NativeParser;
pub use registry::{ParserRegistry, Plugin};
pub use treesitter::{NodeKinds, TreeSitterParser};

use crate::error::Result;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::RwLock;

/// Priority of the native (host language) tier
pub const NATIVE_PRIORITY: u32 = 0;
/// Priority of the tree-sitter tier
pub const TREE_SITTER_PRIORITY: u32 = 50;
/// Default priority for external plugins
pub const EXTERNAL_PRIORITY: u32 = 100;
/// Priority of the regex tier
pub const REGEX_PRIORITY: u32 = 500;

/// A strategy for extracting structure from one or more languages.
///
/// `parse` must not fail for a language the plugin claims to support:
/// malformed input yields an empty [`ParseResult`].
pub trait ParserPlugin: Send {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Lower values are tried first
    fn priority(&self) -> u32 {
        EXTERNAL_PRIORITY
    }

    /// Whether this plugin can parse `language` right now
    fn supports(&self, language: &str) -> bool;

    /// Extract structure from `content`; `path` is recorded on every record
    fn parse(&mut self, content: &str, path: &Path, language: &str) -> ParseResult;
}

/// Factory function type for creating external plugin instances.
///
/// Returning an error marks the plugin as failed to load; it is skipped.
pub type PluginFactory = fn() -> Result<Box<dyn ParserPlugin>>;

static PLUGIN_FACTORIES: Lazy<RwLock<Vec<PluginFactory>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Register an external plugin factory.
///
/// Every [`ParserRegistry`] built afterwards instantiates the plugin, so
/// each parser worker gets its own instance.
pub fn register_plugin(factory: PluginFactory) {
    match PLUGIN_FACTORIES.write() {
        Ok(mut factories) => factories.push(factory),
        Err(poisoned) => poisoned.into_inner().push(factory),
    }
}

/// Instantiate every registered external plugin, skipping failures
pub(crate) fn discover_plugins() -> Vec<Box<dyn ParserPlugin>> {
    let factories: Vec<PluginFactory> = match PLUGIN_FACTORIES.read() {
        Ok(factories) => factories.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };

    factories
        .into_iter()
        .filter_map(|factory| match factory() {
            Ok(plugin) => Some(plugin),
            Err(e) => {
                tracing::warn!("Skipping parser plugin that failed to load: {}", e);
                None
            }
        })
        .collect()
}
