//! Named tasks and the composite tasks built from them

use std::fmt;
use std::time::Instant;

use crate::commands::{build, lint, package, qunit};
use crate::output::{print_task_finished, print_task_started};
use crate::project::Project;

/// A single named task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Lint,
    Build,
    Css,
    Qunit,
    Zip,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Lint => "lint",
            Task::Build => "build",
            Task::Css => "css",
            Task::Qunit => "qunit",
            Task::Zip => "zip",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `deckhand test`
pub const TEST: &[Task] = &[Task::Lint, Task::Qunit];

/// `deckhand default`
pub const DEFAULT: &[Task] = &[Task::Lint, Task::Build, Task::Css, Task::Qunit];

/// `deckhand package`
pub const PACKAGE: &[Task] = &[Task::Lint, Task::Build, Task::Css, Task::Qunit, Task::Zip];

/// Run `tasks` in order, stopping at the first failure
pub async fn run(project: &Project, tasks: &[Task], qunit_args: &qunit::QunitArgs) -> anyhow::Result<()> {
    for task in tasks {
        let started = Instant::now();
        print_task_started(task.name());

        match task {
            Task::Lint => lint::execute(project).await?,
            Task::Build => build::execute_build(project).await?,
            Task::Css => build::execute_css(project).await?,
            Task::Qunit => qunit::execute(project, qunit_args).await?,
            Task::Zip => package::execute(project).await?,
        }

        print_task_finished(task.name(), started.elapsed());
    }
    Ok(())
}
