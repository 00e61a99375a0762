use std::path::PathBuf;
use thiserror::Error;

/// Callmap error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Cannot read directory {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    #[error("No matching source files found")]
    NoFilesFound,

    #[error("Analyzer build failed: {0}")]
    Build(String),

    #[error("Analyzer execution failed: {0}")]
    Execution(String),

    #[error("Analyzer output is not a valid call graph: {0}")]
    Parse(String),

    #[error("Not a file or directory: {0}")]
    InvalidScope(PathBuf),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Callmap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a discovery error
    pub fn discovery(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Discovery {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a build error
    pub fn build(msg: impl Into<String>) -> Self {
        Error::Build(msg.into())
    }

    /// Create an execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Error::Execution(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True for the one non-fatal outcome: nothing to analyze.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::NoFilesFound)
    }
}
