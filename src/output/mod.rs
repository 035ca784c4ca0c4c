// Output generation module
//
// Writes README.md, index.html and analysis.json from an analysis result,
// and converts an existing Markdown document into a standalone HTML page.

pub mod context;
pub mod templates;

pub use context::{build_context, DocContext};
pub use templates::{slugify, TemplateEngine};

use crate::analysis::AnalysisResult;
use crate::config::{Config, OutputFormat};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const README_FILE: &str = "README.md";
pub const HTML_FILE: &str = "index.html";
pub const JSON_FILE: &str = "analysis.json";

/// Serialize an analysis as pretty-printed JSON
pub fn render_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Serialize an analysis as YAML
pub fn render_yaml(result: &AnalysisResult) -> Result<String> {
    Ok(serde_yaml::to_string(result)?)
}

/// Write `contents` to `path`, refusing to replace an existing file unless `force`
pub fn write_file(path: &Path, contents: &str, force: bool) -> Result<()> {
    if !force && path.exists() {
        return Err(Error::OutputExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Text of the first level-one heading
pub fn markdown_title(markdown: &str) -> Option<&str> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|title| !title.is_empty())
}

/// Convert a Markdown document into a standalone HTML page
pub fn markdown_to_html(markdown: &str, title: &str) -> Result<String> {
    TemplateEngine::new()?.render_markdown_page(title, markdown)
}

/// One rendered document, not yet written
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    pub file_name: &'static str,
    pub content: String,
}

/// Files written by one generation run
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub files: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        let names: Vec<_> = self
            .files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy())
            .collect();
        format!("Generated {} file(s): {}", self.files.len(), names.join(", "))
    }
}

/// Renders the documents selected by the output format
pub struct DocGenerator<'a> {
    config: &'a Config,
    engine: TemplateEngine,
    force: bool,
}

impl<'a> DocGenerator<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Self {
            config,
            engine: TemplateEngine::new()?,
            force: false,
        })
    }

    /// Allow replacing documents that already exist
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Render every requested document without touching the filesystem
    pub fn render(&self, result: &AnalysisResult) -> Result<Vec<RenderedDoc>> {
        let mut docs = Vec::new();
        let format = self.config.output.format;

        if format.wants_markdown() || format.wants_html() {
            let ctx = build_context(result, self.config);
            if format.wants_markdown() {
                docs.push(RenderedDoc {
                    file_name: README_FILE,
                    content: self.engine.render_readme(&ctx)?,
                });
            }
            if format.wants_html() {
                docs.push(RenderedDoc {
                    file_name: HTML_FILE,
                    content: self.engine.render_html(&ctx)?,
                });
            }
        }

        if format == OutputFormat::Json {
            docs.push(RenderedDoc {
                file_name: JSON_FILE,
                content: render_json(result)?,
            });
        }

        Ok(docs)
    }

    /// Write every requested document into `out_dir`, creating it if needed.
    ///
    /// Without `force`, nothing is written when any target already exists.
    pub fn generate(&self, result: &AnalysisResult, out_dir: &Path) -> Result<GenerationReport> {
        let docs = self.render(result)?;
        if !self.force {
            if let Some(existing) = docs
                .iter()
                .map(|doc| out_dir.join(doc.file_name))
                .find(|path| path.exists())
            {
                return Err(Error::OutputExists(existing));
            }
        }

        fs::create_dir_all(out_dir)?;
        let mut report = GenerationReport::default();
        for doc in docs {
            let path = out_dir.join(doc.file_name);
            write_file(&path, &doc.content, true)?;
            tracing::info!("Wrote {}", path.display());
            report.files.push(path);
        }
        Ok(report)
    }
}

/// Write the outputs selected by `config.output.format` into `out_dir`
pub fn write_outputs(result: &AnalysisResult, config: &Config, out_dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(DocGenerator::new(config)?.generate(result, out_dir)?.files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::context::tests::sample_result;
    use tempfile::TempDir;

    fn generate(format: OutputFormat) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.format = format;
        let files = write_outputs(&sample_result(), &config, &dir.path().join("docs")).unwrap();
        (dir, files)
    }

    #[test]
    fn test_markdown_only() {
        let (dir, files) = generate(OutputFormat::Markdown);
        assert_eq!(files, vec![dir.path().join("docs/README.md")]);
        assert!(!dir.path().join("docs/index.html").exists());
    }

    #[test]
    fn test_both_formats() {
        let (dir, files) = generate(OutputFormat::Both);
        assert_eq!(files.len(), 2);
        let html = fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
        assert!(html.contains("Greeter"));
    }

    #[test]
    fn test_json_output() {
        let (dir, files) = generate(OutputFormat::Json);
        assert_eq!(files.len(), 1);
        let raw = fs::read_to_string(dir.path().join("docs/analysis.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["project_name"], "demo");
        assert_eq!(value["main_language"], "python");
        assert_eq!(value["functions"][0]["name"], "main");
    }

    #[test]
    fn test_existing_output_is_kept_without_force() {
        let dir = TempDir::new().unwrap();
        let readme = dir.path().join(README_FILE);
        fs::write(&readme, "# Hand written\n").unwrap();
        let config = Config::default();

        let err = DocGenerator::new(&config)
            .unwrap()
            .generate(&sample_result(), dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::OutputExists(ref p) if p == &readme));
        assert_eq!(fs::read_to_string(&readme).unwrap(), "# Hand written\n");

        DocGenerator::new(&config)
            .unwrap()
            .with_force(true)
            .generate(&sample_result(), dir.path())
            .unwrap();
        assert!(fs::read_to_string(&readme).unwrap().starts_with("# demo"));
    }

    #[test]
    fn test_render_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.format = OutputFormat::Both;
        let docs = DocGenerator::new(&config).unwrap().render(&sample_result()).unwrap();

        let names: Vec<_> = docs.iter().map(|d| d.file_name).collect();
        assert_eq!(names, vec![README_FILE, HTML_FILE]);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_yaml_output() {
        let yaml = render_yaml(&sample_result()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["project_name"].as_str(), Some("demo"));
        assert_eq!(value["files_analyzed"].as_u64(), Some(4));
    }

    #[test]
    fn test_markdown_title_and_conversion() {
        let markdown = "Intro line\n# My Tool\n\nUse **it**.\n";
        assert_eq!(markdown_title(markdown), Some("My Tool"));
        assert_eq!(markdown_title("## Only second level\n"), None);

        let html = markdown_to_html(markdown, "My Tool").unwrap();
        assert!(html.contains("<title>My Tool</title>"));
        assert!(html.contains("<strong>it</strong>"));
    }

    #[test]
    fn test_write_file_respects_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_file(&path, "one", false).unwrap();
        assert!(write_file(&path, "two", false).is_err());
        write_file(&path, "three", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "three");
    }

    #[test]
    fn test_report_summary() {
        let report = GenerationReport {
            files: vec![PathBuf::from("out/README.md"), PathBuf::from("out/index.html")],
        };
        assert_eq!(report.summary(), "Generated 2 file(s): README.md, index.html");
    }
}
