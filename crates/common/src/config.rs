//! Project configuration (`deckhand.toml`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the project root
pub const CONFIG_FILE: &str = "deckhand.toml";

/// Top-level project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Local server settings
    pub server: ServerSection,

    /// Browser test suite settings
    pub test: TestSection,

    /// Bundler settings
    pub build: BuildSection,

    /// Theme stylesheet settings
    pub style: StyleSection,

    /// Linter settings
    pub lint: LintSection,

    /// Archive settings
    pub package: PackageSection,
}

/// Local server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Directory served at `/`, relative to the project root
    pub root: PathBuf,

    /// Bind host
    pub host: String,

    /// Bind port (0 picks a free port)
    pub port: u16,

    /// Push reload notifications to connected pages
    pub live_reload: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: "127.0.0.1".to_string(),
            port: 8000,
            live_reload: true,
        }
    }
}

/// Browser test suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSection {
    /// Glob selecting the test documents, relative to the server root
    pub documents: String,

    /// Per-document deadline in seconds
    pub timeout_secs: u64,

    /// Deadline for a browser to come up, in seconds
    pub launch_timeout_secs: u64,

    /// Number of documents run at the same time
    pub concurrency: usize,

    /// Browser engine
    pub browser: Browser,

    /// Run the browser without a window
    pub headless: bool,

    /// Pass local file access flags to the browser
    pub allow_file_access: bool,

    /// Where the `playwright` package is installed
    pub node_modules: PathBuf,

    /// Optional JSON results file
    pub results: Option<PathBuf>,
}

impl Default for TestSection {
    fn default() -> Self {
        Self {
            documents: "test/*.html".to_string(),
            timeout_secs: 60,
            launch_timeout_secs: 30,
            concurrency: 1,
            browser: Browser::default(),
            headless: true,
            allow_file_access: true,
            node_modules: PathBuf::from("node_modules"),
            results: None,
        }
    }
}

impl TestSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

/// Browser engine driven by Playwright
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(Error::InvalidConfig(format!("unknown browser '{}'", other))),
        }
    }
}

/// Bundler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Library entry point
    pub entry: PathBuf,

    /// Output directory for bundles
    pub out_dir: PathBuf,

    /// Global name exported by the UMD bundle
    pub name: String,

    /// Bundler command line prefix
    pub bundler: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("js/index.js"),
            out_dir: PathBuf::from("dist"),
            name: "Reveal".to_string(),
            bundler: vec!["npx".to_string(), "rollup".to_string()],
        }
    }
}

/// Theme stylesheet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSection {
    /// Glob selecting theme sources
    pub sources: String,

    /// Output directory for compiled CSS
    pub out_dir: PathBuf,

    /// Extra import search paths
    pub load_paths: Vec<PathBuf>,

    /// Compiler command line prefix
    pub compiler: Vec<String>,
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            sources: "css/theme/source/*.scss".to_string(),
            out_dir: PathBuf::from("css/theme"),
            load_paths: vec![PathBuf::from("css/theme/template")],
            compiler: vec!["npx".to_string(), "sass".to_string()],
        }
    }
}

/// Linter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintSection {
    /// Files to lint
    pub files: Vec<PathBuf>,

    /// Linter command line prefix
    pub command: Vec<String>,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            files: vec![PathBuf::from("js/reveal.js")],
            command: vec!["npx".to_string(), "jshint".to_string()],
        }
    }
}

/// Archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSection {
    /// Globs selecting the archived files
    pub files: Vec<String>,

    /// Archive path
    pub output: PathBuf,
}

impl Default for PackageSection {
    fn default() -> Self {
        Self {
            files: ["index.html", "css/**", "js/**", "lib/**", "images/**", "plugin/**"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output: PathBuf::from("dist/reveal-js-presentation.zip"),
        }
    }
}

impl DeckConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings no task could run with
    pub fn validate(&self) -> Result<()> {
        if self.test.timeout_secs == 0 {
            return Err(Error::InvalidConfig("test.timeout_secs must be positive".into()));
        }
        if self.test.concurrency == 0 {
            return Err(Error::InvalidConfig("test.concurrency must be positive".into()));
        }
        if self.build.bundler.is_empty() {
            return Err(Error::InvalidConfig("build.bundler must name a command".into()));
        }
        if self.style.compiler.is_empty() {
            return Err(Error::InvalidConfig("style.compiler must name a command".into()));
        }
        if self.lint.command.is_empty() {
            return Err(Error::InvalidConfig("lint.command must name a command".into()));
        }
        Ok(())
    }
}
