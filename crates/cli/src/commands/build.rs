//! Build commands: library bundles and compiled themes

use deckhand_common::{Bundler, StyleCompiler};

use crate::output::print_success;
use crate::project::Project;

/// Bundle the library: minified UMD plus an ES module, with source maps
pub async fn execute_build(project: &Project) -> anyhow::Result<()> {
    let bundler = Bundler::new(&project.config.build)?;
    for artifact in bundler.bundle_release(&project.root).await? {
        print_success(&format!("Built {}", artifact.display()));
    }
    Ok(())
}

/// Compile every theme source into `style.out_dir`
pub async fn execute_css(project: &Project) -> anyhow::Result<()> {
    let style = &project.config.style;
    let compiler = StyleCompiler::new(style)?;
    let outputs = compiler.compile_all(&project.root, style).await?;
    if outputs.is_empty() {
        crate::output::print_warning(&format!("No theme sources matched '{}'", style.sources));
    } else {
        print_success(&format!(
            "Compiled {} theme(s) into {}",
            outputs.len(),
            style.out_dir.display()
        ));
    }
    Ok(())
}
