//! CLI argument parsing

use crate::config::OutputFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Analyze codebases and generate README and HTML documentation
#[derive(Parser, Debug)]
#[command(name = "docgenie")]
#[command(about = "Analyze codebases and generate README and HTML documentation")]
#[command(version)]
pub struct Args {
    /// Emit log lines as JSON objects
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Flags shared by `analyze` and `generate`
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct AnalysisFlags {
    /// Extra glob patterns to ignore (can be repeated)
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Use only the native and regex parser tiers
    #[arg(long)]
    pub no_tree_sitter: bool,

    /// Parse every file, neither reading nor writing the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Number of parse workers
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a codebase and print a summary
    Analyze {
        /// Path to the codebase to analyze
        path: PathBuf,

        /// Print the full analysis as JSON (same as --format json)
        #[arg(long, conflicts_with = "format")]
        json: bool,

        /// Report format (text, json, yaml)
        #[arg(short, long, value_parser = parse_report_format)]
        format: Option<ReportFormat>,

        #[command(flatten)]
        flags: AnalysisFlags,
    },

    /// Analyze a codebase and write documentation files
    Generate {
        /// Path to the codebase to analyze
        path: PathBuf,

        /// Output directory (defaults to the analyzed path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (markdown, html, json, both)
        #[arg(short, long, value_parser = parse_format)]
        format: Option<OutputFormat>,

        /// Config file path (defaults to <path>/.docgenie.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite documents that already exist
        #[arg(long)]
        force: bool,

        /// Print the rendered documents instead of writing them
        #[arg(short, long, conflicts_with = "force")]
        preview: bool,

        #[command(flatten)]
        flags: AnalysisFlags,
    },

    /// Write a starter .docgenie.toml
    Init {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Convert a Markdown file (usually a README) to a standalone HTML page
    Html {
        /// Markdown file to convert
        input: PathBuf,

        /// Output file or directory (defaults to docs.html next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title (defaults to the first level-one heading)
        #[arg(short, long)]
        title: Option<String>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

/// How `analyze` prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

fn parse_report_format(name: &str) -> Result<ReportFormat, String> {
    match name.to_ascii_lowercase().as_str() {
        "text" => Ok(ReportFormat::Text),
        "json" => Ok(ReportFormat::Json),
        "yaml" | "yml" => Ok(ReportFormat::Yaml),
        _ => Err(format!(
            "unknown format '{}' (expected text, json or yaml)",
            name
        )),
    }
}

fn parse_format(name: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(name).ok_or_else(|| {
        format!(
            "unknown format '{}' (expected markdown, html, json or both)",
            name
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let args = Args::try_parse_from(["docgenie", "analyze", "./src"]).unwrap();
        match args.command {
            Command::Analyze { path, json, format, flags } => {
                assert_eq!(path, PathBuf::from("./src"));
                assert!(!json);
                assert_eq!(format, None);
                assert!(flags.ignore.is_empty());
                assert!(!flags.no_tree_sitter);
                assert!(!flags.no_cache);
                assert_eq!(flags.jobs, None);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_options() {
        let args = Args::try_parse_from([
            "docgenie", "analyze", "./project",
            "--ignore", "vendor",
            "--ignore", "*.gen.py",
            "--no-tree-sitter",
            "--no-cache",
            "--jobs", "4",
            "--json",
            "--verbose",
        ])
        .unwrap();

        match args.command {
            Command::Analyze { path, json, flags, .. } => {
                assert_eq!(path, PathBuf::from("./project"));
                assert!(json);
                assert_eq!(flags.ignore, vec!["vendor".to_string(), "*.gen.py".to_string()]);
                assert!(flags.no_tree_sitter);
                assert!(flags.no_cache);
                assert_eq!(flags.jobs, Some(4));
                assert!(flags.verbose);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_generate_with_options() {
        let args = Args::try_parse_from([
            "docgenie", "generate", ".",
            "-o", "/tmp/docs",
            "--format", "both",
            "--config", "custom.toml",
        ])
        .unwrap();

        match args.command {
            Command::Generate { path, output, format, config, force, preview, flags } => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(output, Some(PathBuf::from("/tmp/docs")));
                assert_eq!(format, Some(OutputFormat::Both));
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert!(!force);
                assert!(!preview);
                assert!(!flags.verbose);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_rejects_unknown_format() {
        let err = Args::try_parse_from(["docgenie", "generate", ".", "--format", "pdf"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_analyze_yaml_format() {
        let args = Args::try_parse_from(["docgenie", "analyze", ".", "--format", "yaml"]).unwrap();
        match args.command {
            Command::Analyze { format, .. } => assert_eq!(format, Some(ReportFormat::Yaml)),
            _ => panic!("Expected Analyze command"),
        }
        assert!(Args::try_parse_from(["docgenie", "analyze", ".", "--json", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_generate_force_and_preview_conflict() {
        let args = Args::try_parse_from(["docgenie", "generate", ".", "--force"]).unwrap();
        assert!(matches!(args.command, Command::Generate { force: true, preview: false, .. }));
        assert!(Args::try_parse_from(["docgenie", "generate", ".", "--force", "--preview"]).is_err());
    }

    #[test]
    fn test_init_and_html_commands() {
        let init = Args::try_parse_from(["docgenie", "init"]).unwrap();
        match init.command {
            Command::Init { path, force } => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!force);
            }
            _ => panic!("Expected Init command"),
        }

        let html = Args::try_parse_from([
            "docgenie", "html", "README.md", "-o", "site.html", "--title", "Docs",
        ])
        .unwrap();
        match html.command {
            Command::Html { input, output, title, force } => {
                assert_eq!(input, PathBuf::from("README.md"));
                assert_eq!(output, Some(PathBuf::from("site.html")));
                assert_eq!(title.as_deref(), Some("Docs"));
                assert!(!force);
            }
            _ => panic!("Expected Html command"),
        }
    }

    #[test]
    fn test_json_logs_is_global() {
        let args = Args::try_parse_from(["docgenie", "version", "--json-logs"]).unwrap();
        assert!(args.json_logs);
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["docgenie", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
