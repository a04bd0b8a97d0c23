//! Error types for deckhand build tasks

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the deckhand Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by configuration loading and the build toolchain
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Bundling {entry} failed:\n{diagnostic}")]
    Bundle { entry: PathBuf, diagnostic: String },

    #[error("Compiling {file} failed:\n{diagnostic}")]
    Style { file: PathBuf, diagnostic: String },

    #[error("Lint reported problems in {files} file(s)")]
    Lint { files: usize },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn pattern(pattern: &str, reason: impl ToString) -> Self {
        Error::Pattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
