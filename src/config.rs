use crate::error::{Error, Result};
use crate::ignore::compile_pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up at the project root by [`Config::discover`]
pub const CONFIG_FILE_NAME: &str = ".docgenie.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub readme: ReadmeConfig,
}

/// Project metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Overrides the directory name as project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extra ignore patterns, unioned with the built-in defaults
    pub ignore_patterns: Vec<String>,
    /// Enable the tree-sitter parser tier
    pub tree_sitter: bool,
    /// Reuse parse results from `.docgenie/cache.json`
    pub use_cache: bool,
    /// Parser worker count (rayon default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

/// README rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    pub include_api_docs: bool,
    pub include_directory_tree: bool,
    pub max_functions_documented: usize,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Json,
    Both,
}

impl OutputFormat {
    /// Parse a format name as given on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "both" => Some(OutputFormat::Both),
            _ => None,
        }
    }

    pub fn wants_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn wants_html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Both)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            tree_sitter: true,
            use_cache: true,
            jobs: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: PathBuf::from("."),
        }
    }
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            include_api_docs: true,
            include_directory_tree: true,
            max_functions_documented: 10,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Contents of a starter `.docgenie.toml` holding every default
    pub fn starter_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Config::default())?;
        Ok(format!("# docgenie configuration\n\n{}", body))
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Ignoring config {}: {}", path.display(), e);
                }
                Config::default()
            }
        }
    }

    /// Load `.docgenie.toml` from the project root, or defaults
    pub fn discover(root: &Path) -> Self {
        Self::load_or_default(&root.join(CONFIG_FILE_NAME))
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        ignore: Vec<String>,
        format: Option<OutputFormat>,
        no_tree_sitter: bool,
        no_cache: bool,
        jobs: Option<usize>,
    ) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if !ignore.is_empty() {
            self.analysis.ignore_patterns.extend(ignore);
        }

        if let Some(fmt) = format {
            self.output.format = fmt;
        }

        if no_tree_sitter {
            self.analysis.tree_sitter = false;
        }

        if no_cache {
            self.analysis.use_cache = false;
        }

        if jobs.is_some() {
            self.analysis.jobs = jobs;
        }
    }

    /// Validate configuration, including every ignore pattern
    pub fn validate(&self) -> Result<()> {
        self.validate_limits()?;

        for pattern in &self.analysis.ignore_patterns {
            compile_pattern(pattern)?;
        }

        Ok(())
    }

    /// Check the numeric limits only.
    ///
    /// Ignore patterns are left to [`IgnoreFilter`](crate::ignore::IgnoreFilter),
    /// which drops the ones that do not compile.
    pub fn validate_limits(&self) -> Result<()> {
        if self.analysis.jobs == Some(0) {
            return Err(Error::config_validation("jobs must be at least 1"));
        }

        if self.readme.max_functions_documented == 0 {
            return Err(Error::config_validation(
                "max_functions_documented must be at least 1",
            ));
        }

        Ok(())
    }
}
