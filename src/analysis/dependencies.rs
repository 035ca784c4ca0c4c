//! Dependency extraction from root-level manifest files.
//!
//! Each manifest has its own small parser. A malformed manifest is logged
//! and skipped; one that declares nothing is omitted from the result.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Manifests looked up in the project root, in this order
pub const MANIFEST_FILES: &[&str] = &[
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "Gemfile",
];

/// Dependency names declared by one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    /// A flat list (requirements.txt, go.mod, ...)
    List(Vec<String>),
    /// Named sections (`dependencies`, `devDependencies`, ...)
    Grouped(BTreeMap<String, Vec<String>>),
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        match self {
            Dependencies::List(names) => names.is_empty(),
            Dependencies::Grouped(groups) => groups.values().all(Vec::is_empty),
        }
    }

    /// Every declared name, across all sections
    pub fn names(&self) -> Vec<&str> {
        match self {
            Dependencies::List(names) => names.iter().map(String::as_str).collect(),
            Dependencies::Grouped(groups) => groups
                .values()
                .flat_map(|names| names.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Total number of declared names
    pub fn len(&self) -> usize {
        match self {
            Dependencies::List(names) => names.len(),
            Dependencies::Grouped(groups) => groups.values().map(Vec::len).sum(),
        }
    }
}

/// Read every known manifest in `root`
pub fn detect_dependencies(root: &Path) -> BTreeMap<String, Dependencies> {
    let mut found = BTreeMap::new();

    for &file_name in MANIFEST_FILES {
        let path = root.join(file_name);
        if !path.is_file() {
            continue;
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| Error::manifest(file_name, e.to_string()))
            .and_then(|content| parse_manifest(file_name, &content));

        match parsed {
            Ok(deps) if deps.is_empty() => {
                tracing::debug!("{} declares no dependencies", file_name);
            }
            Ok(deps) => {
                tracing::debug!("{}: {} dependencies", file_name, deps.len());
                found.insert(file_name.to_string(), deps);
            }
            Err(e) => tracing::warn!("Skipping manifest: {}", e),
        }
    }

    found
}

/// Parse the contents of the manifest called `file_name`
pub fn parse_manifest(file_name: &str, content: &str) -> Result<Dependencies> {
    match file_name {
        "requirements.txt" => Ok(Dependencies::List(parse_requirements(content))),
        "pyproject.toml" => parse_pyproject(content),
        "setup.py" => Ok(Dependencies::List(parse_setup_py(content))),
        "package.json" => parse_package_json(content),
        "Cargo.toml" => parse_cargo_toml(content),
        "go.mod" => Ok(Dependencies::List(parse_go_mod(content))),
        "pom.xml" => Ok(Dependencies::List(capture_all(&POM_ARTIFACT, content))),
        "Gemfile" => Ok(Dependencies::List(parse_gemfile(content))),
        other => Err(Error::manifest(other, "unknown manifest type")),
    }
}

static SETUP_REQUIRES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)install_requires\s*=\s*\[(.*?)\]").expect("valid regex"));
static QUOTED_REQUIREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid regex"));
static POM_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<artifactId>(.*?)</artifactId>").expect("valid regex"));
static GEM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^gem\s+["']([^"']+)"#).expect("valid regex"));

fn capture_all(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Package name of a PEP 508 requirement string (`requests>=2; python_version>"3"`)
fn requirement_name(spec: &str) -> &str {
    spec.split(|c: char| matches!(c, '<' | '>' | '=' | '!' | '~' | ';' | '[' | '@' | ' '))
        .next()
        .unwrap_or("")
        .trim()
}

fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .map(requirement_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_setup_py(content: &str) -> Vec<String> {
    SETUP_REQUIRES
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|block| {
            capture_all(&QUOTED_REQUIREMENT, block.as_str())
                .iter()
                .map(|spec| requirement_name(spec))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_go_mod(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_require = false;

    for line in content.lines().map(str::trim) {
        if line.starts_with("require (") {
            in_require = true;
        } else if in_require && line == ")" {
            in_require = false;
        } else if in_require {
            if let Some(module) = line.split_whitespace().next() {
                if !module.starts_with("//") {
                    deps.push(module.to_string());
                }
            }
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(module) = rest.split_whitespace().next() {
                deps.push(module.to_string());
            }
        }
    }

    deps
}

fn parse_gemfile(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| GEM_NAME.captures(line.trim()))
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn parse_package_json(content: &str) -> Result<Dependencies> {
    let data: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| Error::manifest("package.json", e.to_string()))?;

    let mut groups = BTreeMap::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(table) = data.get(section).and_then(|v| v.as_object()) {
            groups.insert(section.to_string(), table.keys().cloned().collect());
        }
    }
    Ok(Dependencies::Grouped(groups))
}

fn parse_toml(file_name: &str, content: &str) -> Result<toml::Value> {
    content
        .parse::<toml::Value>()
        .map_err(|e| Error::manifest(file_name, e.to_string()))
}

fn table_keys(value: Option<&toml::Value>) -> Option<Vec<String>> {
    value
        .and_then(|v| v.as_table())
        .map(|table| table.keys().cloned().collect())
}

fn parse_pyproject(content: &str) -> Result<Dependencies> {
    let data = parse_toml("pyproject.toml", content)?;
    let mut groups = BTreeMap::new();

    if let Some(project) = data.get("project") {
        if let Some(list) = project.get("dependencies").and_then(|v| v.as_array()) {
            let names: Vec<String> = list
                .iter()
                .filter_map(|v| v.as_str())
                .map(requirement_name)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            groups.insert("dependencies".to_string(), names);
        }
        if let Some(extras) = table_keys(project.get("optional-dependencies")) {
            groups.insert("optional-dependencies".to_string(), extras);
        }
    }

    if let Some(poetry) = data.get("tool").and_then(|t| t.get("poetry")) {
        if let Some(deps) = table_keys(poetry.get("dependencies")) {
            groups.insert("poetry-dependencies".to_string(), deps);
        }
        if let Some(deps) = table_keys(poetry.get("dev-dependencies")) {
            groups.insert("poetry-dev-dependencies".to_string(), deps);
        }
    }

    Ok(Dependencies::Grouped(groups))
}

fn parse_cargo_toml(content: &str) -> Result<Dependencies> {
    let data = parse_toml("Cargo.toml", content)?;
    let mut groups = BTreeMap::new();

    for section in ["dependencies", "dev-dependencies", "build-dependencies"] {
        if let Some(names) = table_keys(data.get(section)) {
            groups.insert(section.to_string(), names);
        }
    }
    Ok(Dependencies::Grouped(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_requirements_txt() {
        let deps = parse_manifest(
            "requirements.txt",
            "# comment\nrequests>=2.0\nflask==2.3.1\n-r other.txt\n\nnumpy\npydantic[email]~=2.0\n",
        )
        .unwrap();
        assert_eq!(
            deps,
            Dependencies::List(vec![
                "requests".into(),
                "flask".into(),
                "numpy".into(),
                "pydantic".into()
            ])
        );
    }

    #[test]
    fn test_package_json_sections() {
        let deps = parse_manifest(
            "package.json",
            r#"{"name": "web", "dependencies": {"react": "^18", "react-dom": "^18"}, "devDependencies": {"vite": "^5"}}"#,
        )
        .unwrap();
        let Dependencies::Grouped(groups) = deps else {
            panic!("expected grouped dependencies");
        };
        assert_eq!(groups["dependencies"], vec!["react", "react-dom"]);
        assert_eq!(groups["devDependencies"], vec!["vite"]);
    }

    #[test]
    fn test_malformed_package_json_is_error() {
        let err = parse_manifest("package.json", "{ not json").unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_pyproject_pep621_and_poetry() {
        let content = r#"
[project]
name = "demo"
dependencies = ["httpx>=0.27", "rich"]

[project.optional-dependencies]
dev = ["pytest"]

[tool.poetry.dependencies]
python = "^3.11"
"#;
        let deps = parse_manifest("pyproject.toml", content).unwrap();
        let Dependencies::Grouped(groups) = deps else {
            panic!("expected grouped dependencies");
        };
        assert_eq!(groups["dependencies"], vec!["httpx", "rich"]);
        assert_eq!(groups["optional-dependencies"], vec!["dev"]);
        assert_eq!(groups["poetry-dependencies"], vec!["python"]);
    }

    #[test]
    fn test_setup_py() {
        let content = "setup(\n    name='x',\n    install_requires=[\n        'click>=8',\n        \"toml\",\n    ],\n)\n";
        let deps = parse_manifest("setup.py", content).unwrap();
        assert_eq!(deps, Dependencies::List(vec!["click".into(), "toml".into()]));
    }

    #[test]
    fn test_setup_py_single_line_list() {
        let content = "setup(install_requires=['flask', 'click>=8'])";
        let deps = parse_manifest("setup.py", content).unwrap();
        assert_eq!(deps.names(), vec!["flask", "click"]);
    }

    #[test]
    fn test_cargo_toml() {
        let content = "[package]\nname = \"x\"\n\n[dependencies]\nserde = \"1\"\ntokio = { version = \"1\" }\n\n[dev-dependencies]\ntempfile = \"3\"\n";
        let deps = parse_manifest("Cargo.toml", content).unwrap();
        assert_eq!(deps.names(), vec!["serde", "tokio", "tempfile"]);
    }

    #[test]
    fn test_go_mod_block_and_single() {
        let content = "module example.com/app\n\ngo 1.22\n\nrequire github.com/pkg/errors v0.9.1\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgolang.org/x/sync v0.6.0 // indirect\n)\n";
        let deps = parse_manifest("go.mod", content).unwrap();
        assert_eq!(
            deps.names(),
            vec![
                "github.com/pkg/errors",
                "github.com/gin-gonic/gin",
                "golang.org/x/sync"
            ]
        );
    }

    #[test]
    fn test_pom_and_gemfile() {
        let pom = "<project><artifactId>app</artifactId><dependency><artifactId>junit</artifactId></dependency></project>";
        assert_eq!(parse_manifest("pom.xml", pom).unwrap().names(), vec!["app", "junit"]);

        let gemfile = "source 'https://rubygems.org'\ngem 'rails', '~> 7.0'\ngem \"puma\"\n";
        assert_eq!(parse_manifest("Gemfile", gemfile).unwrap().names(), vec!["rails", "puma"]);
    }

    #[test]
    fn test_detect_skips_malformed_and_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ broken").unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "# nothing here\n").unwrap();
        std::fs::write(dir.path().join("Gemfile"), "gem 'sinatra'\n").unwrap();

        let found = detect_dependencies(dir.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found["Gemfile"], Dependencies::List(vec!["sinatra".into()]));
    }

    #[test]
    fn test_untagged_serialization() {
        let list = Dependencies::List(vec!["a".into()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a"]"#);
        let grouped: Dependencies = serde_json::from_str(r#"{"dependencies": ["b"]}"#).unwrap();
        assert_eq!(grouped.names(), vec!["b"]);
    }
}
