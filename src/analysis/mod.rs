// Codebase analysis pipeline
//
// Walk -> hash + cache check -> parallel parse of cache misses -> aggregate
// in walk order -> structure scan -> dependency scan -> compile.

pub mod dependencies;
pub mod git;
pub mod structure;
pub mod website;

pub use dependencies::{detect_dependencies, Dependencies};
pub use git::{extract_git_info, CommitInfo, GitInfo};
pub use structure::{render_tree, scan_structure, DirectoryEntry, ProjectStructure};
pub use website::{detect_website, project_type, ProjectFacts, WebsiteVerdict};

use crate::cache::{hash_bytes, hash_file, CacheManager};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ignore::IgnoreFilter;
use crate::language::detect_language;
use crate::parser::{Class, Function, ParseResult, ParserRegistry};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Counters describing how one run obtained its parses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Files served from the cache
    pub cache_hits: usize,
    /// Files parsed in this run
    pub parsed: usize,
    /// Files dropped (unreadable, not UTF-8, parser panic)
    pub skipped: usize,
}

/// Everything learned about a project in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub project_name: String,
    pub root_path: PathBuf,
    pub files_analyzed: usize,
    /// Language -> number of analyzed files
    pub languages: BTreeMap<String, usize>,
    pub main_language: Option<String>,
    /// Manifest file name -> declared dependencies
    pub dependencies: BTreeMap<String, Dependencies>,
    pub project_structure: ProjectStructure,
    pub functions: Vec<Function>,
    pub classes: Vec<Class>,
    /// Language -> sorted import targets
    pub imports: BTreeMap<String, Vec<String>>,
    pub documentation_files: Vec<String>,
    pub config_files: Vec<String>,
    pub git_info: GitInfo,
    pub is_website: bool,
    pub website_detection_reason: String,
    pub project_type: String,
    pub stats: AnalysisStats,
    /// Relative path -> why the file was left out
    pub skipped_files: BTreeMap<String, String>,
}

impl AnalysisResult {
    /// Languages by descending file count (ties alphabetical) with their share in percent
    pub fn language_breakdown(&self) -> Vec<(String, usize, f64)> {
        let total = self.files_analyzed.max(1) as f64;
        let mut rows: Vec<_> = self
            .languages
            .iter()
            .map(|(lang, count)| (lang.clone(), *count, *count as f64 * 100.0 / total))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    /// Total number of distinct imports across languages
    pub fn import_count(&self) -> usize {
        self.imports.values().map(Vec::len).sum()
    }
}

/// Work for one parse worker
#[derive(Debug, Clone)]
struct ParseTask {
    path: PathBuf,
    relative: PathBuf,
    enable_tree_sitter: bool,
}

/// What a parse worker sends back
#[derive(Debug)]
struct ParseOutcome {
    relative: PathBuf,
    language: String,
    result: ParseResult,
    hash: String,
}

/// A source file found by the walk, in walk order
enum Slot {
    Cached {
        relative: PathBuf,
        language: String,
        result: ParseResult,
    },
    Queued,
    Failed {
        relative: PathBuf,
        error: Error,
    },
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    filter: IgnoreFilter,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate_limits()?;
        let filter = IgnoreFilter::new(&config.analysis.ignore_patterns);
        Ok(Self {
            config,
            filter,
            verbose: false,
        })
    }

    /// Show a progress bar while parsing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze the project rooted at `root`.
    ///
    /// Fails only when `root` is missing or not a directory; everything
    /// else degrades to a logged skip.
    pub fn analyze(&self, root: &Path) -> Result<AnalysisResult> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::InvalidPath(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| Error::PathNotFound(root.to_path_buf()))?;

        let mut cache = self
            .config
            .analysis
            .use_cache
            .then(|| CacheManager::load(&root));

        // Walk
        let walked = self.walk(&root)?;
        tracing::info!("Found {} source files in {}", walked.sources.len(), root.display());

        // Hash + cache check
        let enable_tree_sitter = self.config.analysis.tree_sitter;
        let mut slots = Vec::with_capacity(walked.sources.len());
        let mut tasks = Vec::new();
        for (path, relative) in &walked.sources {
            let digest = match hash_file(path) {
                Ok(digest) => digest,
                Err(error) => {
                    slots.push(Slot::Failed {
                        relative: relative.clone(),
                        error,
                    });
                    continue;
                }
            };

            match cache.as_ref().and_then(|c| c.get(relative, &digest, enable_tree_sitter)) {
                Some(hit) => {
                    tracing::debug!("Cache hit: {}", relative.display());
                    slots.push(Slot::Cached {
                        relative: relative.clone(),
                        language: hit.language,
                        result: hit.result,
                    });
                }
                None => {
                    slots.push(Slot::Queued);
                    tasks.push(ParseTask {
                        path: path.clone(),
                        relative: relative.clone(),
                        enable_tree_sitter,
                    });
                }
            }
        }

        // Dispatch
        let outcomes = self.dispatch(&tasks)?;

        // Aggregate
        let mut agg = Aggregate::default();
        let mut outcomes = outcomes.into_iter().zip(&tasks);
        for slot in slots {
            match slot {
                Slot::Cached {
                    relative,
                    language,
                    result,
                } => {
                    agg.stats.cache_hits += 1;
                    agg.add(&relative, &language, result);
                }
                Slot::Failed { relative, error } => agg.skip_error(&relative, error)?,
                Slot::Queued => match outcomes.next() {
                    Some((Ok(outcome), _)) => {
                        agg.stats.parsed += 1;
                        if let Some(cache) = cache.as_mut() {
                            cache.set(
                                &outcome.relative,
                                &outcome.hash,
                                outcome.result.clone(),
                                &outcome.language,
                                enable_tree_sitter,
                            );
                        }
                        agg.add(&outcome.relative, &outcome.language, outcome.result);
                    }
                    Some((Err(error), task)) => agg.skip_error(&task.relative, error)?,
                    None => {}
                },
            }
        }
        for (relative, error) in walked.failures {
            agg.skip_error(&relative, error)?;
        }

        // Structure + dependencies
        let project_structure = scan_structure(&root, &self.filter);
        let dependencies = detect_dependencies(&root);

        // Compile
        let main_language = main_language(&agg.languages);
        let facts = ProjectFacts {
            structure: &project_structure,
            dependencies: &dependencies,
            languages: &agg.languages,
            main_language: main_language.as_deref(),
        };
        let verdict = detect_website(&facts);
        let project_type = project_type(&facts, verdict.is_website);
        let git_info = extract_git_info(&root);

        if let Some(cache) = cache.as_mut() {
            let live: HashSet<String> = walked
                .sources
                .iter()
                .map(|(_, rel)| rel.to_string_lossy().replace('\\', "/"))
                .collect();
            let pruned = cache.retain(|key| live.contains(key));
            if pruned > 0 {
                tracing::debug!("Pruned {} stale cache entries", pruned);
            }
            if let Err(e) = cache.persist() {
                tracing::warn!("Could not write cache: {}", e);
            }
        }

        let project_name = self.config.project.name.clone().unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "project".to_string())
        });

        tracing::info!(
            "Analyzed {} files ({} cached, {} parsed, {} skipped)",
            agg.files_analyzed,
            agg.stats.cache_hits,
            agg.stats.parsed,
            agg.stats.skipped
        );

        Ok(AnalysisResult {
            project_name,
            root_path: root,
            files_analyzed: agg.files_analyzed,
            languages: agg.languages,
            main_language,
            dependencies,
            project_structure,
            functions: agg.functions,
            classes: agg.classes,
            imports: agg
                .imports
                .into_iter()
                .map(|(lang, set)| (lang, set.into_iter().collect()))
                .collect(),
            documentation_files: walked.documentation,
            config_files: walked.config,
            git_info,
            is_website: verdict.is_website,
            website_detection_reason: verdict.reason,
            project_type,
            stats: agg.stats,
            skipped_files: agg.skipped,
        })
    }

    /// Collect source, documentation and config files in sorted walk order.
    ///
    /// Ignored directories are pruned before descent. Entries that cannot be
    /// read are kept as failures for the aggregate to classify.
    fn walk(&self, root: &Path) -> Result<Walked> {
        let mut walked = Walked::default();

        let entries = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !self
                        .filter
                        .is_ignored(entry.path().strip_prefix(root).unwrap_or(entry.path()))
            });

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let relative = e
                        .path()
                        .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
                        .filter(|p| !p.as_os_str().is_empty())
                        .unwrap_or_else(|| PathBuf::from("."));
                    walked.failures.push((relative, Error::from(e)));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            let key = structure::relative_key(root, path);

            if is_documentation(&relative) {
                walked.documentation.push(key.clone());
            }
            if is_config_file(&relative) {
                walked.config.push(key);
            }

            if detect_language(&relative).is_some() {
                walked.sources.push((path.to_path_buf(), relative));
            }
        }

        Ok(walked)
    }

    /// Parse every task on the worker pool; results keep task order
    fn dispatch(&self, tasks: &[ParseTask]) -> Result<Vec<Result<ParseOutcome>>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let progress = if self.verbose {
            let pb = ProgressBar::new(tasks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let run = || {
            tasks
                .par_iter()
                .map_init(
                    || ParserRegistry::new(self.config.analysis.tree_sitter),
                    |registry, task| {
                        let outcome = parse_task(registry, task);
                        if let Some(pb) = &progress {
                            pb.inc(1);
                        }
                        outcome
                    },
                )
                .collect::<Vec<_>>()
        };

        let outcomes = match self.config.analysis.jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| Error::other(format!("Failed to start worker pool: {}", e)))?
                .install(run),
            None => run(),
        };

        if let Some(pb) = progress {
            pb.finish_with_message("Parsing complete");
        }

        Ok(outcomes)
    }
}

/// Worker body: read, hash, decode, detect and parse one file
fn parse_task(registry: &mut ParserRegistry, task: &ParseTask) -> Result<ParseOutcome> {
    let bytes = std::fs::read(&task.path)?;
    let hash = hash_bytes(&bytes);
    let content = String::from_utf8(bytes).map_err(|_| Error::Decode(task.relative.clone()))?;
    let language = detect_language(&task.relative)
        .ok_or_else(|| Error::parse(&task.relative, "unrecognized language"))?;

    let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
        registry.parse(&content, &task.relative, language)
    }));

    match parsed {
        Ok(result) => Ok(ParseOutcome {
            relative: task.relative.clone(),
            language: language.to_string(),
            result,
            hash,
        }),
        Err(_) => {
            // The panicking plugin may hold broken state
            *registry = ParserRegistry::new(task.enable_tree_sitter);
            Err(Error::parse(&task.relative, "parser panicked"))
        }
    }
}

#[derive(Default)]
struct Walked {
    sources: Vec<(PathBuf, PathBuf)>,
    documentation: Vec<String>,
    config: Vec<String>,
    failures: Vec<(PathBuf, Error)>,
}

#[derive(Default)]
struct Aggregate {
    files_analyzed: usize,
    languages: BTreeMap<String, usize>,
    functions: Vec<Function>,
    classes: Vec<Class>,
    imports: BTreeMap<String, BTreeSet<String>>,
    stats: AnalysisStats,
    skipped: BTreeMap<String, String>,
}

impl Aggregate {
    fn add(&mut self, relative: &Path, language: &str, result: ParseResult) {
        tracing::trace!("Aggregating {} ({})", relative.display(), language);
        self.files_analyzed += 1;
        *self.languages.entry(language.to_string()).or_default() += 1;
        self.functions.extend(result.functions);
        self.classes.extend(result.classes);
        if !result.imports.is_empty() {
            self.imports
                .entry(language.to_string())
                .or_default()
                .extend(result.imports);
        }
    }

    /// Record a per-file failure; errors that are not recoverable end the run
    fn skip_error(&mut self, relative: &Path, error: Error) -> Result<()> {
        if !error.is_recoverable() {
            return Err(error);
        }
        tracing::debug!("Skipping {}: {}", relative.display(), error);
        self.skip(relative, error.to_string());
        Ok(())
    }

    fn skip(&mut self, relative: &Path, reason: String) {
        self.stats.skipped += 1;
        self.skipped
            .insert(relative.to_string_lossy().replace('\\', "/"), reason);
    }
}

/// Most common language; ties go to the alphabetically first
fn main_language(languages: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (lang, &count) in languages {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((lang, count));
        }
    }
    best.map(|(lang, _)| lang.clone())
}

const DOC_STEMS: &[&str] = &[
    "readme",
    "changelog",
    "contributing",
    "license",
    "licence",
    "code_of_conduct",
];

fn is_documentation(relative: &Path) -> bool {
    let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let lower = name.to_ascii_lowercase();
    let stem = lower.split('.').next().unwrap_or("");
    if DOC_STEMS.contains(&stem) {
        return true;
    }

    let in_docs = relative
        .components()
        .next()
        .map_or(false, |c| c.as_os_str().eq_ignore_ascii_case("docs"));
    in_docs && (lower.ends_with(".md") || lower.ends_with(".rst"))
}

fn is_config_file(relative: &Path) -> bool {
    relative
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .map_or(false, |e| {
            matches!(e.as_str(), "json" | "yaml" | "yml" | "toml" | "ini" | "cfg")
        })
}

/// Analyze `root` with default settings plus extra ignore patterns
pub fn analyze(
    root: &Path,
    extra_ignore_patterns: &[String],
    enable_tree_sitter: bool,
) -> Result<AnalysisResult> {
    let mut config = Config::default();
    config.analysis.ignore_patterns = extra_ignore_patterns.to_vec();
    config.analysis.tree_sitter = enable_tree_sitter;
    Analyzer::new(config)?.analyze(root)
}
