use std::path::PathBuf;
use thiserror::Error;

/// DocGenie error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Cannot decode {0} as UTF-8 text")]
    Decode(PathBuf),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Malformed manifest {file}: {message}")]
    Manifest { file: String, message: String },

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("{0} already exists (pass --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for DocGenie operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Error::Cache(msg.into())
    }

    /// Create a manifest error
    pub fn manifest(file: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Manifest {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        Error::Plugin(msg.into())
    }

    /// Create a glob pattern error
    pub fn glob_pattern(pattern: impl Into<String>, source: glob::PatternError) -> Self {
        Error::GlobPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether an analysis run can skip past this error and keep going.
    ///
    /// Only a root path that is missing or not a directory aborts a run;
    /// per-file, cache, manifest and plugin failures degrade gracefully.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::PathNotFound(_) | Error::InvalidPath(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("/foo/bar.py", "unexpected token");
        assert!(err.to_string().contains("/foo/bar.py"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = Error::Decode(PathBuf::from("blob.py"));
        assert_eq!(err.to_string(), "Cannot decode blob.py as UTF-8 text");
    }

    #[test]
    fn test_manifest_error_display() {
        let err = Error::manifest("package.json", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "Malformed manifest package.json: expected value at line 1"
        );
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("jobs must be at least 1");
        assert_eq!(err.to_string(), "Config validation error: jobs must be at least 1");
    }

    #[test]
    fn test_output_exists_display() {
        let err = Error::OutputExists(PathBuf::from("docs/README.md"));
        assert_eq!(
            err.to_string(),
            "docs/README.md already exists (pass --force to overwrite)"
        );
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(!Error::PathNotFound(PathBuf::from("/missing")).is_recoverable());
        assert!(!Error::InvalidPath(PathBuf::from("/etc/hosts")).is_recoverable());
        assert!(Error::Decode(PathBuf::from("a.py")).is_recoverable());
        assert!(Error::cache("corrupt").is_recoverable());
        assert!(Error::manifest("go.mod", "bad").is_recoverable());
        assert!(Error::plugin("factory failed").is_recoverable());
        assert!(Error::parse("a.rs", "expected item").is_recoverable());
    }

    #[test]
    fn test_glob_pattern_display() {
        let source = glob::Pattern::new("[unclosed").unwrap_err();
        let err = Error::glob_pattern("[unclosed", source);
        assert!(err.to_string().starts_with("Invalid glob pattern '[unclosed'"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
