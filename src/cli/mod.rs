//! CLI module for DocGenie

mod args;

pub use args::{AnalysisFlags, Args, Command, ReportFormat};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::config::{Config, OutputFormat, CONFIG_FILE_NAME};
use crate::error::{Error, Result};
use crate::output::{
    markdown_title, markdown_to_html, render_json, render_yaml, write_file, DocGenerator,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.command.verbose(), args.json_logs);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::Analyze { flags, .. } | Command::Generate { flags, .. } => flags.verbose,
            Command::Init { .. } | Command::Html { .. } | Command::Version => false,
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the `--verbose` default
fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "docgenie=debug" } else { "docgenie=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Default file name for `html` output
const HTML_PAGE_FILE: &str = "docs.html";

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            json,
            format,
            flags,
        } => {
            let config = configure(&path, None, None, None, &flags)?;
            let analysis = run_analysis(&path, config, flags.verbose)?;
            let format = if json {
                ReportFormat::Json
            } else {
                format.unwrap_or_default()
            };
            match format {
                ReportFormat::Text => print_summary(&analysis),
                ReportFormat::Json => println!("{}", render_json(&analysis)?),
                ReportFormat::Yaml => print!("{}", render_yaml(&analysis)?),
            }
            Ok(())
        }

        Command::Generate {
            path,
            output,
            format,
            config,
            force,
            preview,
            flags,
        } => {
            let cfg = configure(&path, config.as_deref(), output, format, &flags)?;
            let out_dir = resolve_output_dir(&path, &cfg.output.directory);
            let analysis = run_analysis(&path, cfg.clone(), flags.verbose)?;
            let generator = DocGenerator::new(&cfg)?.with_force(force);

            if preview {
                for doc in generator.render(&analysis)? {
                    println!("==> {} <==", doc.file_name);
                    println!("{}", doc.content);
                }
                return Ok(());
            }

            let report = generator.generate(&analysis, &out_dir)?;
            println!("{}", report.summary());
            for file in &report.files {
                println!("  {}", file.display());
            }
            Ok(())
        }

        Command::Init { path, force } => {
            if !path.is_dir() {
                return Err(Error::InvalidPath(path));
            }
            let target = path.join(CONFIG_FILE_NAME);
            write_file(&target, &Config::starter_toml()?, force)?;
            println!("Created {}", target.display());
            Ok(())
        }

        Command::Html {
            input,
            output,
            title,
            force,
        } => {
            let target = html_target(&input, output)?;
            let markdown = std::fs::read_to_string(&input)?;
            let title = title
                .or_else(|| markdown_title(&markdown).map(str::to_string))
                .unwrap_or_else(|| {
                    input
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| "Documentation".to_string())
                });
            write_file(&target, &markdown_to_html(&markdown, &title)?, force)?;
            println!("HTML generated: {}", target.display());
            Ok(())
        }

        Command::Version => {
            println!("docgenie {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load the config file (explicit or discovered) and apply CLI overrides
fn configure(
    path: &Path,
    config_file: Option<&Path>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    flags: &AnalysisFlags,
) -> Result<Config> {
    let mut cfg = match config_file {
        Some(file) => Config::load(file)?,
        None => Config::discover(path),
    };
    cfg.merge_cli(
        output,
        flags.ignore.clone(),
        format,
        flags.no_tree_sitter,
        flags.no_cache,
        flags.jobs,
    );
    cfg.validate()?;
    Ok(cfg)
}

/// Where `html` writes: `docs.html` beside the input, or inside a given directory
fn html_target(input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
    if !input.is_file() {
        return Err(Error::PathNotFound(input.to_path_buf()));
    }
    let is_markdown = input
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| matches!(e.to_ascii_lowercase().as_str(), "md" | "markdown"));
    if !is_markdown {
        return Err(Error::InvalidPath(input.to_path_buf()));
    }

    Ok(match output {
        Some(dir) if dir.is_dir() => dir.join(HTML_PAGE_FILE),
        Some(file) => file,
        None => input
            .parent()
            .map(|p| p.join(HTML_PAGE_FILE))
            .unwrap_or_else(|| PathBuf::from(HTML_PAGE_FILE)),
    })
}

/// A relative output directory from the config file is taken relative to the project
fn resolve_output_dir(project: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project.join(dir)
    }
}

fn run_analysis(path: &Path, config: Config, verbose: bool) -> Result<AnalysisResult> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }
    if verbose {
        eprintln!("Analyzing: {}", path.display());
        eprintln!("Tree-sitter: {}", config.analysis.tree_sitter);
        eprintln!("Cache: {}", config.analysis.use_cache);
        if !config.analysis.ignore_patterns.is_empty() {
            eprintln!("Ignore: {:?}", config.analysis.ignore_patterns);
        }
    }
    Analyzer::new(config)?.with_verbose(verbose).analyze(path)
}

fn print_summary(analysis: &AnalysisResult) {
    println!("Project: {}", analysis.project_name);
    println!("Type: {}", analysis.project_type);
    if let Some(lang) = &analysis.main_language {
        println!("Main language: {}", lang);
    }
    println!(
        "Analysis complete: {} files, {} classes, {} functions, {} imports",
        analysis.files_analyzed,
        analysis.classes.len(),
        analysis.functions.len(),
        analysis.import_count()
    );
    println!(
        "Cache: {} hits, {} parsed",
        analysis.stats.cache_hits, analysis.stats.parsed
    );

    if !analysis.languages.is_empty() {
        println!("\nLanguages:");
        for (lang, count, pct) in analysis.language_breakdown() {
            println!("  {:<12} {:>5} files ({:.1}%)", lang, count, pct);
        }
    }

    if !analysis.dependencies.is_empty() {
        println!("\nDependencies:");
        for (manifest, deps) in &analysis.dependencies {
            println!("  {}: {}", manifest, deps.len());
        }
    }

    println!(
        "\nWebsite: {} ({})",
        if analysis.is_website { "yes" } else { "no" },
        analysis.website_detection_reason
    );

    if !analysis.skipped_files.is_empty() {
        println!("\nSkipped files ({}):", analysis.skipped_files.len());
        for (path, reason) in analysis.skipped_files.iter().take(5) {
            println!("  {}: {}", path, reason);
        }
        if analysis.skipped_files.len() > 5 {
            println!("  ... and {} more", analysis.skipped_files.len() - 5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_output_dir() {
        let project = Path::new("/work/app");
        assert_eq!(resolve_output_dir(project, Path::new(".")), PathBuf::from("/work/app/."));
        assert_eq!(resolve_output_dir(project, Path::new("/tmp/out")), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_configure_merges_flags_over_discovered_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".docgenie.toml"),
            "[analysis]\nignore_patterns = [\"vendor\"]\n\n[output]\nformat = \"html\"\n",
        )
        .unwrap();

        let flags = AnalysisFlags {
            ignore: vec!["*.gen.py".into()],
            no_cache: true,
            ..Default::default()
        };
        let cfg = configure(dir.path(), None, None, Some(OutputFormat::Json), &flags).unwrap();
        assert_eq!(cfg.analysis.ignore_patterns, vec!["vendor", "*.gen.py"]);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(!cfg.analysis.use_cache);
        assert!(cfg.analysis.tree_sitter);
    }

    #[test]
    fn test_configure_rejects_zero_jobs() {
        let dir = TempDir::new().unwrap();
        let flags = AnalysisFlags {
            jobs: Some(0),
            ..Default::default()
        };
        assert!(configure(dir.path(), None, None, None, &flags).is_err());
    }

    #[test]
    fn test_html_target() {
        let dir = TempDir::new().unwrap();
        let readme = dir.path().join("README.md");
        fs::write(&readme, "# Demo\n").unwrap();

        assert_eq!(html_target(&readme, None).unwrap(), dir.path().join("docs.html"));
        assert_eq!(
            html_target(&readme, Some(dir.path().to_path_buf())).unwrap(),
            dir.path().join("docs.html")
        );
        let explicit = dir.path().join("site/page.html");
        assert_eq!(html_target(&readme, Some(explicit.clone())).unwrap(), explicit);

        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "plain").unwrap();
        assert!(matches!(html_target(&notes, None), Err(Error::InvalidPath(_))));
        assert!(matches!(
            html_target(&dir.path().join("missing.md"), None),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = configure(dir.path(), Some(&missing), None, None, &AnalysisFlags::default());
        assert!(result.is_err());
    }
}
