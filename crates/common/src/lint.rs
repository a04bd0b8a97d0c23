//! Source linting through an external linter

use std::path::Path;

use tracing::{info, warn};

use crate::config::LintSection;
use crate::error::{Error, Result};
use crate::tool::Tool;

/// Run the configured linter over the configured files.
///
/// The linter's own report is passed through to stdout; a non-zero exit
/// status fails the task.
pub async fn lint(root: &Path, config: &LintSection) -> Result<()> {
    let tool = Tool::from_command(&config.command)
        .ok_or_else(|| Error::InvalidConfig("lint.command must name a command".into()))?;

    if config.files.is_empty() {
        warn!("No files configured for linting");
        return Ok(());
    }

    let output = tool.run(root, &config.files, None).await?;
    let report = output.stdout.trim_end();
    if !report.is_empty() {
        println!("{}", report);
    }

    if !output.success() {
        let stderr = output.stderr.trim_end();
        if !stderr.is_empty() {
            eprintln!("{}", stderr);
        }
        return Err(Error::Lint {
            files: config.files.len(),
        });
    }

    info!("Lint passed ({} file(s))", config.files.len());
    Ok(())
}
