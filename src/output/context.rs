// Render context built from an analysis
//
// Templates never see `AnalysisResult` directly; they get this flattened,
// pre-sorted view with the README heuristics already applied.

use crate::analysis::{render_tree, AnalysisResult, CommitInfo, Dependencies};
use crate::config::Config;
use serde::Serialize;

const TREE_DEPTH: usize = 3;
const TREE_FILES_PER_DIR: usize = 10;
const MAX_CLASSES_DOCUMENTED: usize = 10;
const MAX_METHODS_PER_CLASS: usize = 5;
const ENTRY_POINT_NAMES: &[&str] = &["main", "run", "start", "execute"];

#[derive(Debug, Clone, Serialize)]
pub struct LanguageRow {
    pub name: String,
    pub files: usize,
    pub percent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyGroup {
    /// Section name; empty for flat manifests
    pub name: String,
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencySection {
    pub manifest: String,
    pub groups: Vec<DependencyGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandHint {
    pub title: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDoc {
    pub name: String,
    pub signature: String,
    pub location: String,
    pub summary: Option<String>,
    pub decorators: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassDoc {
    pub name: String,
    pub location: String,
    pub summary: Option<String>,
    pub bases: Vec<String>,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GitSummary {
    pub repo_name: Option<String>,
    pub remote_url: Option<String>,
    pub branch: Option<String>,
    pub latest_commit: Option<CommitInfo>,
    pub contributors: Option<usize>,
}

/// Everything the README and HTML templates render
#[derive(Debug, Clone, Serialize)]
pub struct DocContext {
    pub project_name: String,
    pub project_type: String,
    pub description: String,
    pub is_website: bool,
    pub website_reason: String,
    pub main_language: Option<String>,
    pub total_files: usize,
    pub functions_count: usize,
    pub classes_count: usize,
    pub languages: Vec<LanguageRow>,
    pub requirements: Vec<String>,
    pub install_commands: Vec<CommandHint>,
    pub usage_examples: Vec<CommandHint>,
    pub dependencies: Vec<DependencySection>,
    pub directory_tree: Option<String>,
    pub functions: Vec<FunctionDoc>,
    pub classes: Vec<ClassDoc>,
    pub has_tests: bool,
    pub documentation_files: Vec<String>,
    pub config_files: Vec<String>,
    pub git: Option<GitSummary>,
    pub generator: String,
}

/// Build the render context for `result` under `config`'s README settings
pub fn build_context(result: &AnalysisResult, config: &Config) -> DocContext {
    let readme = &config.readme;
    let api_enabled = readme.include_api_docs && !result.is_website;

    let functions = if api_enabled {
        result
            .functions
            .iter()
            .filter(|f| f.is_public())
            .take(readme.max_functions_documented)
            .map(|f| FunctionDoc {
                name: f.name.clone(),
                signature: f.signature(),
                location: format!("{}:{}", f.file.display(), f.line),
                summary: f.summary().map(str::to_string),
                decorators: f.decorators.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let classes = if api_enabled {
        result
            .classes
            .iter()
            .filter(|c| c.is_public())
            .take(MAX_CLASSES_DOCUMENTED)
            .map(|c| ClassDoc {
                name: c.name.clone(),
                location: format!("{}:{}", c.file.display(), c.line),
                summary: c.summary().map(str::to_string),
                bases: c.bases.clone(),
                methods: c
                    .public_methods()
                    .take(MAX_METHODS_PER_CLASS)
                    .map(|m| m.signature())
                    .collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let git = (!result.git_info.is_empty()).then(|| GitSummary {
        repo_name: result.git_info.repo_name.clone(),
        remote_url: result.git_info.remote_url.clone(),
        branch: result.git_info.current_branch.clone(),
        latest_commit: result.git_info.latest_commit.clone(),
        contributors: result.git_info.contributor_count,
    });

    DocContext {
        project_name: result.project_name.clone(),
        project_type: result.project_type.clone(),
        description: config
            .project
            .description
            .clone()
            .unwrap_or_else(|| describe(result)),
        is_website: result.is_website,
        website_reason: result.website_detection_reason.clone(),
        main_language: result.main_language.clone(),
        total_files: result.files_analyzed,
        functions_count: result.functions.len(),
        classes_count: result.classes.len(),
        languages: result
            .language_breakdown()
            .into_iter()
            .map(|(name, files, pct)| LanguageRow {
                name,
                files,
                percent: format!("{:.1}", pct),
            })
            .collect(),
        requirements: requirements(result),
        install_commands: install_commands(result),
        usage_examples: usage_examples(result),
        dependencies: dependency_sections(result),
        directory_tree: readme
            .include_directory_tree
            .then(|| render_tree(&result.project_structure, TREE_DEPTH, TREE_FILES_PER_DIR)),
        functions,
        classes,
        has_tests: has_tests(result),
        documentation_files: result.documentation_files.clone(),
        config_files: result.config_files.clone(),
        git,
        generator: format!("docgenie {}", env!("CARGO_PKG_VERSION")),
    }
}

fn root_files(result: &AnalysisResult) -> &[String] {
    result
        .project_structure
        .get(crate::analysis::structure::ROOT_KEY)
        .map(|e| e.files.as_slice())
        .unwrap_or(&[])
}

fn has_root_file(result: &AnalysisResult, name: &str) -> bool {
    root_files(result).iter().any(|f| f == name)
}

fn describe(result: &AnalysisResult) -> String {
    if result.is_website {
        return format!("A {} project.", result.project_type.to_lowercase());
    }
    match &result.main_language {
        Some(lang) => format!(
            "A {} project with {} source files, {} functions and {} classes.",
            lang,
            result.files_analyzed,
            result.functions.len(),
            result.classes.len()
        ),
        None => "A software project.".to_string(),
    }
}

fn dependency_sections(result: &AnalysisResult) -> Vec<DependencySection> {
    result
        .dependencies
        .iter()
        .map(|(manifest, deps)| {
            let groups = match deps {
                Dependencies::List(names) => vec![DependencyGroup {
                    name: String::new(),
                    packages: names.clone(),
                }],
                Dependencies::Grouped(groups) => groups
                    .iter()
                    .filter(|(_, names)| !names.is_empty())
                    .map(|(name, names)| DependencyGroup {
                        name: name.clone(),
                        packages: names.clone(),
                    })
                    .collect(),
            };
            DependencySection {
                manifest: manifest.clone(),
                groups,
            }
        })
        .collect()
}

fn requirements(result: &AnalysisResult) -> Vec<String> {
    let deps = &result.dependencies;
    let mut reqs = Vec::new();

    if deps.contains_key("package.json") {
        reqs.push("Node.js 18 or higher".to_string());
        reqs.push("npm or yarn".to_string());
    }
    if ["requirements.txt", "pyproject.toml", "setup.py"]
        .iter()
        .any(|m| deps.contains_key(*m))
    {
        reqs.push("Python 3.8 or higher".to_string());
        reqs.push("pip".to_string());
    }
    if deps.contains_key("Cargo.toml") {
        reqs.push("Rust (stable) and Cargo".to_string());
    }
    if deps.contains_key("go.mod") {
        reqs.push("Go 1.18 or higher".to_string());
    }
    if deps.contains_key("pom.xml") {
        reqs.push("Java 11 or higher".to_string());
        reqs.push("Maven 3.6 or higher".to_string());
    }
    if deps.contains_key("Gemfile") {
        reqs.push("Ruby and Bundler".to_string());
    }
    reqs
}

fn hint(title: &str, command: &str) -> CommandHint {
    CommandHint {
        title: title.to_string(),
        command: command.to_string(),
    }
}

fn install_commands(result: &AnalysisResult) -> Vec<CommandHint> {
    let mut cmds = Vec::new();

    if has_root_file(result, "requirements.txt") {
        cmds.push(hint("Install Python dependencies", "pip install -r requirements.txt"));
    } else if has_root_file(result, "pyproject.toml") {
        cmds.push(hint("Install the package", "pip install ."));
    } else if has_root_file(result, "setup.py") {
        cmds.push(hint("Install the package", "pip install -e ."));
    }
    if has_root_file(result, "package.json") {
        cmds.push(hint("Install Node.js dependencies", "npm install"));
    }
    if has_root_file(result, "Cargo.toml") {
        cmds.push(hint("Build the Rust project", "cargo build --release"));
    }
    if has_root_file(result, "go.mod") {
        cmds.push(hint("Download Go modules", "go mod download"));
    }
    if has_root_file(result, "pom.xml") {
        cmds.push(hint("Build with Maven", "mvn clean install"));
    } else if has_root_file(result, "build.gradle") {
        cmds.push(hint("Build with Gradle", "./gradlew build"));
    }
    if has_root_file(result, "Gemfile") {
        cmds.push(hint("Install gems", "bundle install"));
    }
    cmds
}

fn usage_examples(result: &AnalysisResult) -> Vec<CommandHint> {
    let has_entry = result
        .functions
        .iter()
        .any(|f| ENTRY_POINT_NAMES.contains(&f.name.as_str()));

    let example = match result.main_language.as_deref() {
        Some("python") if has_entry => Some(hint("Run the application", "python main.py")),
        Some("javascript") | Some("typescript") => Some(hint("Start the application", "npm start")),
        Some("rust") => Some(hint("Run the application", "cargo run")),
        Some("go") => Some(hint("Run the application", "go run .")),
        Some("java") => Some(hint("Run the application", "java -jar target/app.jar")),
        _ => None,
    };
    example.into_iter().collect()
}

fn has_tests(result: &AnalysisResult) -> bool {
    let test_dir = result.project_structure.keys().any(|path| {
        path.split('/')
            .any(|seg| matches!(seg.to_ascii_lowercase().as_str(), "test" | "tests" | "spec" | "__tests__"))
    });
    test_dir
        || root_files(result).iter().any(|f| {
            let lower = f.to_ascii_lowercase();
            lower.starts_with("test_") || lower.contains("_test.") || lower.contains(".test.")
        })
}
