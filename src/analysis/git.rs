//! Git repository metadata using the git CLI.
//!
//! Every field is best-effort: a missing `git` binary, a directory outside a
//! repository or a failing subcommand leaves that field empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Latest commit on HEAD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub date: String,
    pub message: String,
}

/// Repository facts shown in generated docs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// `owner/repo` derived from the remote URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_commit: Option<CommitInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_count: Option<usize>,
}

impl GitInfo {
    pub fn is_empty(&self) -> bool {
        self == &GitInfo::default()
    }
}

/// Run `git` in `repo_path`, returning trimmed stdout on success
fn git(repo_path: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

/// Collect repository metadata for the project at `repo_path`
pub fn extract_git_info(repo_path: &Path) -> GitInfo {
    if git(repo_path, &["rev-parse", "--is-inside-work-tree"]).as_deref() != Some("true") {
        tracing::debug!("{} is not inside a git work tree", repo_path.display());
        return GitInfo::default();
    }

    let remote_url = git(repo_path, &["remote", "get-url", "origin"]);
    let repo_name = remote_url.as_deref().map(repo_name_from_url);

    // Detached HEAD prints "HEAD"
    let current_branch = git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])
        .filter(|branch| branch != "HEAD");

    let latest_commit = git(
        repo_path,
        &["log", "-1", "--pretty=format:%H%x1f%an%x1f%ae%x1f%aI%x1f%B"],
    )
    .and_then(|raw| parse_commit(&raw));

    let contributor_count = git(repo_path, &["shortlog", "-sn", "HEAD"])
        .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count());

    GitInfo {
        remote_url,
        repo_name,
        current_branch,
        latest_commit,
        contributor_count,
    }
}

fn parse_commit(raw: &str) -> Option<CommitInfo> {
    let mut parts = raw.splitn(5, '\u{1f}');
    Some(CommitInfo {
        hash: parts.next()?.to_string(),
        author_name: parts.next()?.to_string(),
        author_email: parts.next()?.to_string(),
        date: parts.next()?.to_string(),
        message: parts.next()?.trim().to_string(),
    })
}

static SSH_REMOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([^/]+/[^/]+?)(?:\.git)?$").expect("valid regex"));
static HTTP_REMOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([^/]+/[^/]+?)(?:\.git)?/?$").expect("valid regex"));

/// `owner/repo` from an SSH or HTTPS remote URL; the URL itself if neither matches
pub fn repo_name_from_url(url: &str) -> String {
    let re = if url.starts_with("git@") {
        &*SSH_REMOTE
    } else {
        &*HTTP_REMOTE
    };
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url.to_string())
}
