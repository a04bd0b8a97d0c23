//! Lint command

use deckhand_common::lint;

use crate::output::print_success;
use crate::project::Project;

pub async fn execute(project: &Project) -> anyhow::Result<()> {
    lint::lint(&project.root, &project.config.lint).await?;
    print_success("Lint passed");
    Ok(())
}
