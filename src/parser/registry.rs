// Priority-ordered parser selection

use super::{
    discover_plugins, NativeParser, ParseResult, ParserPlugin, RegexParser, TreeSitterParser,
    NATIVE_PRIORITY, REGEX_PRIORITY, TREE_SITTER_PRIORITY,
};
use std::fmt;
use std::path::Path;

/// A parsing tier known to the registry
pub enum Plugin {
    Native(NativeParser),
    TreeSitter(TreeSitterParser),
    Regex(RegexParser),
    External(Box<dyn ParserPlugin>),
}

impl Plugin {
    fn as_plugin(&self) -> &dyn ParserPlugin {
        match self {
            Plugin::Native(p) => p,
            Plugin::TreeSitter(p) => p,
            Plugin::Regex(p) => p,
            Plugin::External(p) => p.as_ref(),
        }
    }

    fn as_plugin_mut(&mut self) -> &mut dyn ParserPlugin {
        match self {
            Plugin::Native(p) => p,
            Plugin::TreeSitter(p) => p,
            Plugin::Regex(p) => p,
            Plugin::External(p) => p.as_mut(),
        }
    }
}

impl ParserPlugin for Plugin {
    fn name(&self) -> &str {
        self.as_plugin().name()
    }

    fn priority(&self) -> u32 {
        match self {
            Plugin::Native(_) => NATIVE_PRIORITY,
            Plugin::TreeSitter(_) => TREE_SITTER_PRIORITY,
            Plugin::Regex(_) => REGEX_PRIORITY,
            Plugin::External(p) => p.priority(),
        }
    }

    fn supports(&self, language: &str) -> bool {
        self.as_plugin().supports(language)
    }

    fn parse(&mut self, content: &str, path: &Path, language: &str) -> ParseResult {
        self.as_plugin_mut().parse(content, path, language)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plugin({}, priority {})", self.name(), self.priority())
    }
}

/// Ordered list of parser plugins.
///
/// Not shared between threads: each parse worker builds its own registry.
#[derive(Debug)]
pub struct ParserRegistry {
    plugins: Vec<Plugin>,
}

impl ParserRegistry {
    /// Built-in tiers plus every registered external plugin
    pub fn new(enable_tree_sitter: bool) -> Self {
        Self::with_plugins(enable_tree_sitter, Vec::new())
    }

    /// Built-in tiers, `extra`, and registered external plugins
    pub fn with_plugins(enable_tree_sitter: bool, extra: Vec<Box<dyn ParserPlugin>>) -> Self {
        let mut plugins = vec![Plugin::Native(NativeParser::new())];
        if enable_tree_sitter {
            plugins.push(Plugin::TreeSitter(TreeSitterParser::new()));
        }
        plugins.push(Plugin::Regex(RegexParser::new()));
        plugins.extend(extra.into_iter().map(Plugin::External));
        plugins.extend(discover_plugins().into_iter().map(Plugin::External));

        // Stable: equal priorities keep insertion order
        plugins.sort_by_key(|p| p.priority());

        tracing::debug!(
            "Parser registry: {}",
            plugins
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self { plugins }
    }

    /// Plugins in resolution order
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// The first plugin that supports `language`
    pub fn resolve(&self, language: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.supports(language))
    }

    /// Parse with the highest-priority plugin for `language`.
    ///
    /// Returns an empty result when no plugin supports the language.
    pub fn parse(&mut self, content: &str, path: &Path, language: &str) -> ParseResult {
        match self.plugins.iter_mut().find(|p| p.supports(language)) {
            Some(plugin) => plugin.parse(content, path, language),
            None => {
                tracing::debug!("No parser for {} ({})", path.display(), language);
                ParseResult::default()
            }
        }
    }
}
