//! QUnit command: run the browser test suite

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::info;

use deckhand_common::config::TestSection;
use deckhand_common::{Browser, Error};
use deckhand_harness::{PlaywrightConfig, PlaywrightRunner, SuiteConfig, SuiteRunner};
use deckhand_server::ServerConfig;

use crate::project::Project;

#[derive(Args, Debug, Clone, Default)]
pub struct QunitArgs {
    /// Port for the test server (default: server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Per-document deadline in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Documents to run at the same time
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Browser engine: chromium, firefox or webkit
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Write the results as JSON to this file
    #[arg(long)]
    pub results: Option<PathBuf>,
}

impl QunitArgs {
    /// Test settings with command-line overrides applied
    pub fn apply(&self, base: &TestSection) -> anyhow::Result<TestSection> {
        let mut test = base.clone();
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(Error::InvalidConfig("--timeout must be positive".into()).into());
            }
            test.timeout_secs = timeout;
        }
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(Error::InvalidConfig("--jobs must be positive".into()).into());
            }
            test.concurrency = jobs;
        }
        if let Some(browser) = self.browser {
            test.browser = browser;
        }
        if self.headed {
            test.headless = false;
        }
        if let Some(results) = &self.results {
            test.results = Some(results.clone());
        }
        Ok(test)
    }
}

/// Suite settings for `project` with `test` applied
pub fn suite_config(project: &Project, test: &TestSection, port: Option<u16>) -> SuiteConfig {
    SuiteConfig {
        server: ServerConfig {
            root: project.server_root(),
            host: project.config.server.host.clone(),
            port: port.unwrap_or(project.config.server.port),
            live_reload: false,
        },
        documents: test.documents.clone(),
        deadline: test.timeout(),
        concurrency: test.concurrency,
        results_path: test.results.as_ref().map(|p| project.resolve(p)),
    }
}

fn playwright_config(project: &Project, test: &TestSection) -> PlaywrightConfig {
    PlaywrightConfig {
        browser: test.browser,
        headless: test.headless,
        allow_file_access: test.allow_file_access,
        node_modules: project.resolve(&test.node_modules),
        launch_timeout: test.launch_timeout(),
        // navigation shares the document deadline
        navigation_timeout: test.timeout().max(Duration::from_secs(1)),
        ..Default::default()
    }
}

pub async fn execute(project: &Project, args: &QunitArgs) -> anyhow::Result<()> {
    let test = args.apply(&project.config.test)?;

    PlaywrightRunner::check_installed().await?;
    let runner = PlaywrightRunner::new(playwright_config(project, &test))?;

    info!(
        "Running '{}' in {} ({} at a time)",
        test.documents, test.browser, test.concurrency
    );
    let mut suite = SuiteRunner::new(suite_config(project, &test, args.port), Arc::new(runner));
    let summary = suite.run_all().await?;

    summary.verdict()?;
    Ok(())
}
