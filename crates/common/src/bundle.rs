//! Library bundling through an external module bundler

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::BuildSection;
use crate::error::{Error, Result};
use crate::tool::Tool;

/// Output module format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// Single-file bundle usable from a script tag or a CommonJS/AMD loader
    Umd,
    /// ES module for bundler-aware consumers
    Es,
}

impl ModuleFormat {
    fn flag(&self) -> &'static str {
        match self {
            ModuleFormat::Umd => "umd",
            ModuleFormat::Es => "es",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            ModuleFormat::Umd => "js",
            ModuleFormat::Es => "esm.js",
        }
    }
}

/// One requested bundle
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub format: ModuleFormat,
    pub minify: bool,
    pub source_map: bool,
}

/// Runs the configured bundler over the library entry point
pub struct Bundler {
    tool: Tool,
    entry: PathBuf,
    out_dir: PathBuf,
    name: String,
}

impl Bundler {
    pub fn new(config: &BuildSection) -> Result<Self> {
        let tool = Tool::from_command(&config.bundler)
            .ok_or_else(|| Error::InvalidConfig("build.bundler must name a command".into()))?;
        Ok(Self {
            tool,
            entry: config.entry.clone(),
            out_dir: config.out_dir.clone(),
            name: config.name.clone(),
        })
    }

    /// Output file for a format, e.g. `dist/reveal.esm.js`
    pub fn output_path(&self, format: ModuleFormat) -> PathBuf {
        let stem = self
            .entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle".to_string());
        let stem = if stem == "index" { self.name.to_lowercase() } else { stem };
        self.out_dir.join(format!("{}.{}", stem, format.suffix()))
    }

    /// Arguments passed after the configured command prefix
    pub fn arguments(&self, options: &BundleOptions) -> Vec<String> {
        let mut args = vec![
            self.entry.to_string_lossy().into_owned(),
            "--format".to_string(),
            options.format.flag().to_string(),
            "--file".to_string(),
            self.output_path(options.format).to_string_lossy().into_owned(),
        ];
        if options.format == ModuleFormat::Umd {
            args.push("--name".to_string());
            args.push(self.name.clone());
        }
        if options.source_map {
            args.push("--sourcemap".to_string());
        }
        if options.minify {
            args.push("--plugin".to_string());
            args.push("terser".to_string());
        }
        args
    }

    /// Build one artifact, returning its path (relative to `root`)
    pub async fn bundle(&self, root: &Path, options: &BundleOptions) -> Result<PathBuf> {
        std::fs::create_dir_all(root.join(&self.out_dir))?;

        let output = self.tool.run(root, self.arguments(options), None).await?;
        if !output.success() {
            return Err(Error::Bundle {
                entry: self.entry.clone(),
                diagnostic: output.diagnostic(),
            });
        }

        let path = self.output_path(options.format);
        info!("Bundled {} -> {}", self.entry.display(), path.display());
        Ok(path)
    }

    /// The release pair: minified UMD plus an ES module, both with source maps
    pub async fn bundle_release(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut artifacts = Vec::new();
        for (format, minify) in [(ModuleFormat::Umd, true), (ModuleFormat::Es, false)] {
            let options = BundleOptions {
                format,
                minify,
                source_map: true,
            };
            artifacts.push(self.bundle(root, &options).await?);
        }
        Ok(artifacts)
    }
}
