//! Theme stylesheet compilation through an external style compiler

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::StyleSection;
use crate::error::{Error, Result};
use crate::paths;
use crate::tool::Tool;

/// Compiles theme sources to CSS
pub struct StyleCompiler {
    tool: Tool,
    load_paths: Vec<PathBuf>,
}

impl StyleCompiler {
    pub fn new(config: &StyleSection) -> Result<Self> {
        let tool = Tool::from_command(&config.compiler)
            .ok_or_else(|| Error::InvalidConfig("style.compiler must name a command".into()))?;
        Ok(Self {
            tool,
            load_paths: config.load_paths.clone(),
        })
    }

    /// Compile style source text; `file` is only used for diagnostics
    pub async fn compile(&self, root: &Path, file: &Path, source: &str) -> Result<String> {
        let mut args = vec!["--stdin".to_string(), "--no-source-map".to_string()];
        for load_path in &self.load_paths {
            args.push(format!("--load-path={}", load_path.display()));
        }
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            args.push(format!("--load-path={}", parent.display()));
        }

        let output = self.tool.run(root, args, Some(source.as_bytes())).await?;
        if !output.success() {
            return Err(Error::Style {
                file: file.to_path_buf(),
                diagnostic: output.diagnostic(),
            });
        }
        Ok(output.stdout)
    }

    /// Compile one source file into `out_dir/<stem>.css`, returning the output path
    pub async fn compile_file(&self, root: &Path, file: &Path, out_dir: &Path) -> Result<PathBuf> {
        let source = std::fs::read_to_string(root.join(file))?;
        let css = self.compile(root, file, &source).await?;

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out = out_dir.join(format!("{}.css", stem));
        std::fs::create_dir_all(root.join(out_dir))?;
        std::fs::write(root.join(&out), css)?;

        info!("Compiled {} -> {}", file.display(), out.display());
        Ok(out)
    }

    /// Compile every configured theme, stopping at the first failure
    pub async fn compile_all(&self, root: &Path, config: &StyleSection) -> Result<Vec<PathBuf>> {
        let sources = paths::expand(root, &config.sources)?;
        let mut outputs = Vec::with_capacity(sources.len());
        for file in &sources {
            outputs.push(self.compile_file(root, file, &config.out_dir).await?);
        }
        Ok(outputs)
    }
}
