// Project directory snapshot

use crate::ignore::IgnoreFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Key used for the analyzed root itself
pub const ROOT_KEY: &str = "root";

/// Immediate children of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// Relative directory path (`/`-separated, [`ROOT_KEY`] for the root) to its children
pub type ProjectStructure = BTreeMap<String, DirectoryEntry>;

/// Relative path of `path` under `root` with `/` separators
pub(crate) fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let key = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if key.is_empty() {
        ROOT_KEY.to_string()
    } else {
        key
    }
}

/// Walk `root` and record every non-ignored directory with its children
pub fn scan_structure(root: &Path, filter: &IgnoreFilter) -> ProjectStructure {
    let mut structure = ProjectStructure::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !filter.is_ignored(entry.path().strip_prefix(root).unwrap_or(entry.path()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            structure
                .entry(relative_key(root, entry.path()))
                .or_default();
        }
        if entry.depth() == 0 {
            continue;
        }

        let parent = entry
            .path()
            .parent()
            .map(|p| relative_key(root, p))
            .unwrap_or_else(|| ROOT_KEY.to_string());
        let name = entry.file_name().to_string_lossy().to_string();
        let slot = structure.entry(parent).or_default();
        if entry.file_type().is_dir() {
            slot.dirs.push(name);
        } else {
            slot.files.push(name);
        }
    }

    structure
}

/// Render the structure as an indented tree.
///
/// Directories deeper than `max_depth` are collapsed and each directory
/// lists at most `max_files` files.
pub fn render_tree(structure: &ProjectStructure, max_depth: usize, max_files: usize) -> String {
    let mut lines = Vec::new();
    render_dir(structure, ROOT_KEY, "", 0, max_depth, max_files, &mut lines);
    if lines.is_empty() {
        "No files found".to_string()
    } else {
        lines.join("\n")
    }
}

fn render_dir(
    structure: &ProjectStructure,
    key: &str,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    max_files: usize,
    lines: &mut Vec<String>,
) {
    let Some(entry) = structure.get(key) else {
        return;
    };

    let hidden = entry.files.len().saturating_sub(max_files);
    let mut items: Vec<(String, bool)> = entry.dirs.iter().map(|d| (d.clone(), true)).collect();
    items.extend(entry.files.iter().take(max_files).map(|f| (f.clone(), false)));
    if hidden > 0 {
        items.push((format!("... and {} more files", hidden), false));
    }

    let count = items.len();
    for (i, (name, is_dir)) in items.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        if !is_dir {
            lines.push(format!("{}{}{}", prefix, connector, name));
            continue;
        }

        lines.push(format!("{}{}{}/", prefix, connector, name));
        if depth + 1 < max_depth {
            let child_key = if key == ROOT_KEY {
                name.clone()
            } else {
                format!("{}/{}", key, name)
            };
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_dir(
                structure,
                &child_key,
                &child_prefix,
                depth + 1,
                max_depth,
                max_files,
                lines,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/utils")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/react")).unwrap();
        fs::write(dir.path().join("README.md"), "# x").unwrap();
        fs::write(dir.path().join("src/main.py"), "").unwrap();
        fs::write(dir.path().join("src/utils/io.py"), "").unwrap();
        fs::write(dir.path().join("node_modules/react/index.js"), "").unwrap();
        fs::write(dir.path().join("debug.log"), "").unwrap();
        dir
    }

    #[test]
    fn test_scan_structure() {
        let dir = sample_project();
        let structure = scan_structure(dir.path(), &IgnoreFilter::default());

        assert_eq!(structure.len(), 3);
        assert_eq!(structure[ROOT_KEY].files, vec!["README.md"]);
        assert_eq!(structure[ROOT_KEY].dirs, vec!["src"]);
        assert_eq!(structure["src"].files, vec!["main.py"]);
        assert_eq!(structure["src"].dirs, vec!["utils"]);
        assert_eq!(structure["src/utils"].files, vec!["io.py"]);
        assert!(!structure.contains_key("node_modules"));
    }

    #[test]
    fn test_relative_key() {
        let root = Path::new("/project");
        assert_eq!(relative_key(root, Path::new("/project")), ROOT_KEY);
        assert_eq!(relative_key(root, Path::new("/project/a/b")), "a/b");
    }

    #[test]
    fn test_render_tree() {
        let dir = sample_project();
        let structure = scan_structure(dir.path(), &IgnoreFilter::default());
        let tree = render_tree(&structure, 3, 10);
        assert_eq!(
            tree,
            "├── src/\n│   ├── utils/\n│   │   └── io.py\n│   └── main.py\n└── README.md"
        );
    }

    #[test]
    fn test_render_tree_limits() {
        let mut structure = ProjectStructure::new();
        structure.insert(
            ROOT_KEY.to_string(),
            DirectoryEntry {
                files: (0..4).map(|i| format!("f{}.txt", i)).collect(),
                dirs: vec!["deep".into()],
            },
        );
        structure.insert(
            "deep".to_string(),
            DirectoryEntry {
                files: vec!["hidden.txt".into()],
                dirs: vec![],
            },
        );

        let tree = render_tree(&structure, 1, 2);
        assert!(tree.contains("deep/"));
        assert!(!tree.contains("hidden.txt"));
        assert!(tree.contains("... and 2 more files"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_tree(&ProjectStructure::new(), 3, 10), "No files found");
    }
}
