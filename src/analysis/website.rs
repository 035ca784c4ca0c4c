//! Website classification and project type labelling.
//!
//! Both are heuristics over already-collected facts: root file names,
//! directory names, dependency names and language counts.

use super::dependencies::Dependencies;
use super::structure::{ProjectStructure, ROOT_KEY};
use crate::language::WEB_LANGUAGES;
use std::collections::BTreeMap;

/// HTML files that mark a site entry point
const ENTRY_FILES: &[&str] = &[
    "index.html",
    "index.htm",
    "home.html",
    "main.html",
    "default.html",
];

/// Config files of static site generators
const STATIC_SITE_MARKERS: &[&str] = &[
    "_config.yml",
    "gatsby-config.js",
    "next.config.js",
    "nuxt.config.js",
    "hugo.toml",
    "hugo.yaml",
    "_config.toml",
    "mkdocs.yml",
    "docusaurus.config.js",
];

/// Dependency names that indicate a web framework
const WEB_FRAMEWORKS: &[&str] = &[
    "react", "vue", "angular", "svelte", "gatsby", "next", "nuxt", "hugo", "jekyll", "express",
    "koa", "fastify", "django", "flask", "fastapi", "rails", "sinatra", "laravel", "symfony",
];

/// Directory names typical of web assets
const WEB_DIRS: &[&str] = &[
    "public", "static", "assets", "dist", "build", "www", "html", "css", "js", "images", "img",
];

const CSS_RATIO_THRESHOLD: f64 = 0.3;
const WEB_DIR_RATIO_THRESHOLD: f64 = 0.2;

/// Facts the heuristics look at
#[derive(Debug, Clone, Copy)]
pub struct ProjectFacts<'a> {
    pub structure: &'a ProjectStructure,
    pub dependencies: &'a BTreeMap<String, Dependencies>,
    pub languages: &'a BTreeMap<String, usize>,
    pub main_language: Option<&'a str>,
}

impl<'a> ProjectFacts<'a> {
    fn root_files(&self) -> &'a [String] {
        self.structure
            .get(ROOT_KEY)
            .map(|entry| entry.files.as_slice())
            .unwrap_or(&[])
    }

    fn has_root_file(&self, name: &str) -> bool {
        self.root_files().iter().any(|f| f == name)
    }

    /// Share of analyzed files written in web languages
    fn web_ratio(&self) -> f64 {
        let total: usize = self.languages.values().sum();
        if total == 0 {
            return 0.0;
        }
        let web: usize = WEB_LANGUAGES
            .iter()
            .filter_map(|lang| self.languages.get(*lang))
            .sum();
        web as f64 / total as f64
    }

    /// First dependency matching `framework`, with the manifest declaring it
    fn find_dependency(&self, framework: &str) -> Option<&'a str> {
        self.dependencies.iter().find_map(|(manifest, deps)| {
            deps.names()
                .into_iter()
                .any(|name| dependency_matches(name, framework))
                .then_some(manifest.as_str())
        })
    }

    fn has_dependency(&self, framework: &str) -> bool {
        self.find_dependency(framework).is_some()
    }
}

/// `react` matches `react`, `React` and scoped packages such as `@react/native`
fn dependency_matches(name: &str, framework: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == framework || name.starts_with(&format!("@{}/", framework))
}

/// Outcome of the website heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteVerdict {
    pub is_website: bool,
    /// Which rule fired, or why none did
    pub reason: String,
}

/// Decide whether the project is a website, checking the rules in order
pub fn detect_website(facts: &ProjectFacts<'_>) -> WebsiteVerdict {
    let root_files = facts.root_files();

    if let Some(entry) = ENTRY_FILES.iter().find(|f| facts.has_root_file(f)) {
        return verdict(format!("HTML entry file found: {}", entry));
    }

    if let Some(marker) = STATIC_SITE_MARKERS.iter().find(|f| facts.has_root_file(f)) {
        return verdict(format!("Static site generator config found: {}", marker));
    }

    for framework in WEB_FRAMEWORKS {
        if let Some(manifest) = facts.find_dependency(framework) {
            return verdict(format!(
                "Web framework dependency detected: {} ({})",
                framework, manifest
            ));
        }
    }

    let ratio = facts.web_ratio();
    let has_css = root_files.iter().any(|f| f.ends_with(".css"));
    if has_css && ratio > CSS_RATIO_THRESHOLD {
        return verdict(format!(
            "CSS assets with {:.0}% web-language files",
            ratio * 100.0
        ));
    }

    let web_dir = facts
        .structure
        .keys()
        .filter(|key| key.as_str() != ROOT_KEY)
        .flat_map(|key| key.split('/'))
        .find(|segment| WEB_DIRS.contains(&segment.to_ascii_lowercase().as_str()));
    if let Some(dir) = web_dir {
        if ratio > WEB_DIR_RATIO_THRESHOLD {
            return verdict(format!(
                "Web asset directory '{}' with {:.0}% web-language files",
                dir,
                ratio * 100.0
            ));
        }
    }

    WebsiteVerdict {
        is_website: false,
        reason: "No website indicators found".to_string(),
    }
}

fn verdict(reason: String) -> WebsiteVerdict {
    WebsiteVerdict {
        is_website: true,
        reason,
    }
}

/// Human label for the kind of project ("React Website", "Rust Application", ...)
pub fn project_type(facts: &ProjectFacts<'_>, is_website: bool) -> String {
    let has_package_json = facts.has_root_file("package.json");

    if is_website {
        if has_package_json {
            let label = [
                ("react", "React Website"),
                ("vue", "Vue.js Website"),
                ("angular", "Angular Website"),
                ("gatsby", "Gatsby Static Website"),
                ("next", "Next.js Website"),
            ]
            .iter()
            .find(|(dep, _)| facts.has_dependency(dep))
            .map(|(_, label)| *label)
            .unwrap_or("JavaScript Website");
            return label.to_string();
        }
        if ["_config.yml", "hugo.toml", "hugo.yaml"]
            .iter()
            .any(|f| facts.has_root_file(f))
        {
            return "Static Website (Hugo/Jekyll)".to_string();
        }
        if facts.has_dependency("django") {
            return "Django Website".to_string();
        }
        if facts.has_dependency("flask") {
            return "Flask Website".to_string();
        }
        return "Website".to_string();
    }

    if has_package_json {
        let label = [
            ("react", "React Application"),
            ("vue", "Vue.js Application"),
            ("angular", "Angular Application"),
            ("express", "Node.js/Express Application"),
        ]
        .iter()
        .find(|(dep, _)| facts.has_dependency(dep))
        .map(|(_, label)| *label)
        .unwrap_or("Node.js Application");
        return label.to_string();
    }

    if ["requirements.txt", "pyproject.toml", "setup.py"]
        .iter()
        .any(|f| facts.has_root_file(f))
    {
        let label = [
            ("django", "Django Application"),
            ("flask", "Flask Application"),
            ("fastapi", "FastAPI Application"),
        ]
        .iter()
        .find(|(dep, _)| facts.has_dependency(dep))
        .map(|(_, label)| *label)
        .unwrap_or("Python Application");
        return label.to_string();
    }

    let by_manifest = [
        ("Cargo.toml", "Rust Application"),
        ("go.mod", "Go Application"),
        ("pom.xml", "Java Application"),
        ("build.gradle", "Java Application"),
        ("Gemfile", "Ruby Application"),
    ];
    if let Some((_, label)) = by_manifest.iter().find(|(f, _)| facts.has_root_file(f)) {
        return label.to_string();
    }

    match facts.main_language {
        Some(lang) => format!("{} Project", title_case(lang)),
        None => "Software Project".to_string(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::structure::DirectoryEntry;

    struct Fixture {
        structure: ProjectStructure,
        dependencies: BTreeMap<String, Dependencies>,
        languages: BTreeMap<String, usize>,
    }

    impl Fixture {
        fn new(root_files: &[&str]) -> Self {
            let mut structure = ProjectStructure::new();
            structure.insert(
                ROOT_KEY.to_string(),
                DirectoryEntry {
                    files: root_files.iter().map(|f| f.to_string()).collect(),
                    dirs: vec![],
                },
            );
            Self {
                structure,
                dependencies: BTreeMap::new(),
                languages: BTreeMap::new(),
            }
        }

        fn dep(mut self, manifest: &str, names: &[&str]) -> Self {
            self.dependencies.insert(
                manifest.to_string(),
                Dependencies::List(names.iter().map(|n| n.to_string()).collect()),
            );
            self
        }

        fn lang(mut self, lang: &str, count: usize) -> Self {
            self.languages.insert(lang.to_string(), count);
            self
        }

        fn dir(mut self, key: &str) -> Self {
            self.structure.insert(key.to_string(), DirectoryEntry::default());
            self
        }

        fn facts(&self) -> ProjectFacts<'_> {
            ProjectFacts {
                structure: &self.structure,
                dependencies: &self.dependencies,
                languages: &self.languages,
                main_language: self
                    .languages
                    .iter()
                    .max_by_key(|(_, count)| **count)
                    .map(|(lang, _)| lang.as_str()),
            }
        }
    }

    #[test]
    fn test_html_entry_file() {
        let fx = Fixture::new(&["index.html"]).lang("html", 1);
        let v = detect_website(&fx.facts());
        assert!(v.is_website);
        assert_eq!(v.reason, "HTML entry file found: index.html");
    }

    #[test]
    fn test_framework_dependency_reason() {
        let fx = Fixture::new(&["index.js", "package.json"])
            .dep("package.json", &["react"])
            .lang("javascript", 1)
            .lang("json", 1);
        let v = detect_website(&fx.facts());
        assert!(v.is_website);
        assert!(v.reason.contains("framework"));
        assert!(v.reason.contains("react (package.json)"));
        assert_eq!(project_type(&fx.facts(), true), "React Website");
    }

    #[test]
    fn test_framework_match_is_exact_or_scoped() {
        let fx = Fixture::new(&[]).dep("package.json", &["preact-render", "nextgen"]);
        assert!(!detect_website(&fx.facts()).is_website);

        let fx = Fixture::new(&[]).dep("package.json", &["@angular/core"]);
        assert!(detect_website(&fx.facts()).is_website);
    }

    #[test]
    fn test_static_site_marker() {
        let fx = Fixture::new(&["mkdocs.yml"]);
        let v = detect_website(&fx.facts());
        assert_eq!(v.reason, "Static site generator config found: mkdocs.yml");
    }

    #[test]
    fn test_css_ratio() {
        let fx = Fixture::new(&["style.css"]).lang("css", 2).lang("python", 3);
        assert!(detect_website(&fx.facts()).is_website);

        let fx = Fixture::new(&["style.css"]).lang("css", 1).lang("python", 9);
        assert!(!detect_website(&fx.facts()).is_website);
    }

    #[test]
    fn test_web_dir_ratio() {
        let fx = Fixture::new(&[])
            .dir("public/images")
            .lang("javascript", 1)
            .lang("python", 3);
        let v = detect_website(&fx.facts());
        assert!(v.is_website);
        assert!(v.reason.contains("'public'"));
    }

    #[test]
    fn test_plain_library_is_not_website() {
        let fx = Fixture::new(&["Cargo.toml"]).lang("rust", 10);
        let v = detect_website(&fx.facts());
        assert!(!v.is_website);
        assert_eq!(project_type(&fx.facts(), false), "Rust Application");
    }

    #[test]
    fn test_python_project_types() {
        let fx = Fixture::new(&["requirements.txt"]).dep("requirements.txt", &["fastapi"]);
        assert_eq!(project_type(&fx.facts(), false), "FastAPI Application");

        let fx = Fixture::new(&["setup.py"]);
        assert_eq!(project_type(&fx.facts(), false), "Python Application");
    }

    #[test]
    fn test_fallback_to_main_language() {
        let fx = Fixture::new(&["main.c"]).lang("c", 3);
        assert_eq!(project_type(&fx.facts(), false), "C Project");
        let fx = Fixture::new(&[]);
        assert_eq!(project_type(&fx.facts(), false), "Software Project");
    }
}
