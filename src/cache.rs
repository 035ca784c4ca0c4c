//! Incremental parse cache keyed by content hash.
//!
//! The cache lives at `<root>/.docgenie/cache.json`. It is read once when a
//! run starts and written once when it ends; a missing or corrupt file is an
//! empty cache.

use crate::error::{Error, Result};
use crate::parser::ParseResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Directory created under the analyzed root
pub const CACHE_DIR_NAME: &str = ".docgenie";
/// Cache file inside [`CACHE_DIR_NAME`]
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Parse result as stored in the cache, tagged with its language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedParse {
    #[serde(flatten)]
    pub result: ParseResult,
    pub language: String,
}

/// One cached file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hex SHA-256 of the file bytes
    pub hash: String,
    /// Whether the tree-sitter tier was enabled for the parse
    #[serde(default)]
    pub tree_sitter: bool,
    pub parse: CachedParse,
}

/// File-backed map from path to its last parse
#[derive(Debug)]
pub struct CacheManager {
    cache_file: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheManager {
    /// Load the cache for the project at `root`.
    ///
    /// Never fails: an unreadable or malformed cache file is logged and
    /// treated as empty.
    pub fn load(root: &Path) -> Self {
        let cache_file = root.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME);
        let entries = match read_entries(&cache_file) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding cache {}: {}", cache_file.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            cache_file,
            entries,
        }
    }

    /// Path of the cache file
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Directory holding the cache file
    pub fn cache_dir(&self) -> &Path {
        self.cache_file.parent().unwrap_or(&self.cache_file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached parse for `path` if its stored hash equals `digest`
    /// and it was produced with the same tree-sitter setting
    pub fn get(&self, path: &Path, digest: &str, tree_sitter: bool) -> Option<CachedParse> {
        self.entries
            .get(&cache_key(path))
            .filter(|entry| entry.hash == digest && entry.tree_sitter == tree_sitter)
            .map(|entry| entry.parse.clone())
    }

    /// Insert or replace the entry for `path`
    pub fn set(
        &mut self,
        path: &Path,
        digest: &str,
        result: ParseResult,
        language: &str,
        tree_sitter: bool,
    ) {
        self.entries.insert(
            cache_key(path),
            CacheEntry {
                hash: digest.to_string(),
                tree_sitter,
                parse: CachedParse {
                    result,
                    language: language.to_string(),
                },
            },
        );
    }

    /// Drop entries for which `keep` returns false; returns how many were dropped
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        before - self.entries.len()
    }

    /// Write the whole cache to disk.
    ///
    /// The JSON goes to a sibling temp file first and is renamed over the
    /// cache file, so a crash never leaves a truncated cache behind.
    pub fn persist(&self) -> Result<()> {
        std::fs::create_dir_all(self.cache_dir())?;

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.cache_file.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.cache_file).map_err(|e| {
            Error::cache(format!(
                "failed to replace {}: {}",
                self.cache_file.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Persisted {} cache entries to {}",
            self.entries.len(),
            self.cache_file.display()
        );
        Ok(())
    }
}

fn read_entries(cache_file: &Path) -> Result<BTreeMap<String, CacheEntry>> {
    if !cache_file.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = std::fs::read_to_string(cache_file)?;
    let entries = serde_json::from_str(&contents)
        .map_err(|e| Error::cache(format!("malformed cache file: {}", e)))?;
    Ok(entries)
}

/// Cache keys use `/` separators regardless of platform
fn cache_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Hex-encoded SHA-256 of a byte slice
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hex-encoded SHA-256 of a file's contents, read in 8 KiB chunks
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
