//! Zip command: package the presentation for distribution

use deckhand_common::archive;

use crate::output::print_success;
use crate::project::Project;

pub async fn execute(project: &Project) -> anyhow::Result<()> {
    let package = &project.config.package;
    let root = project.root.clone();
    let files = package.files.clone();
    let output = package.output.clone();

    // zip writing is blocking file IO
    let summary = tokio::task::spawn_blocking(move || archive::zip(&root, &files, &output)).await??;

    print_success(&format!(
        "Packaged {} file(s) into {}",
        summary.entries.len(),
        summary.path.display()
    ));
    Ok(())
}
