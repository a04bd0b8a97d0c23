//! Resolving the project root and its configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use deckhand_common::DeckConfig;

/// A presentation tree plus its loaded configuration
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory every configured path is relative to
    pub root: PathBuf,
    pub config: DeckConfig,
}

impl Project {
    /// Load the project described by `config_path`.
    ///
    /// The project root is the directory holding the config file, whether or
    /// not the file exists; a missing file means default settings.
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let root = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let config = DeckConfig::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        debug!("Project root: {}", root.display());
        Ok(Self { root, config })
    }

    /// Directory the local server serves
    pub fn server_root(&self) -> PathBuf {
        self.root.join(&self.config.server.root)
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
