//! Suite runner: serves the documents, runs each one, aggregates the outcome

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use deckhand_server::{LocalServer, ServerConfig, ServerHandle};

use crate::error::HarnessResult;
use crate::executor::{DocumentExecutor, DEFAULT_DEADLINE};
use crate::model::{self, DocumentResult, RunSummary, TestDocument};
use crate::report::Reporter;
use crate::session::ProcessRunner;

/// Configuration for a suite run
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Local server serving the documents
    pub server: ServerConfig,

    /// Glob selecting the documents, relative to the server root
    pub documents: String,

    /// Per-document deadline
    pub deadline: Duration,

    /// Documents run at the same time
    pub concurrency: usize,

    /// Where to write the JSON results, if anywhere
    pub results_path: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                live_reload: false,
                ..Default::default()
            },
            documents: "test/*.html".to_string(),
            deadline: DEFAULT_DEADLINE,
            concurrency: 1,
            results_path: None,
        }
    }
}

/// Runs a whole suite of test documents
pub struct SuiteRunner {
    config: SuiteConfig,
    runner: Arc<dyn ProcessRunner>,
    reporter: Reporter,
}

impl SuiteRunner {
    pub fn new(config: SuiteConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self::with_reporter(config, runner, Reporter::stdout())
    }

    pub fn with_reporter(config: SuiteConfig, runner: Arc<dyn ProcessRunner>, reporter: Reporter) -> Self {
        Self {
            config,
            runner,
            reporter,
        }
    }

    /// Enumerate the configured documents
    pub fn discover(&self) -> HarnessResult<Vec<TestDocument>> {
        model::discover(&self.config.server.root, &self.config.documents)
    }

    /// Discover and run every configured document
    pub async fn run_all(&mut self) -> HarnessResult<RunSummary> {
        let documents = self.discover()?;
        self.run_suite(&documents).await
    }

    /// Run `documents` and aggregate their results.
    ///
    /// The local server is started before the first document and stopped
    /// once after the last, whatever the documents did. Per-document
    /// failures are recorded in the summary; the returned error is reserved
    /// for the server failing to start. Use [`RunSummary::verdict`] for the
    /// pass/fail outcome.
    pub async fn run_suite(&mut self, documents: &[TestDocument]) -> HarnessResult<RunSummary> {
        if documents.is_empty() {
            warn!("No test documents matched '{}'", self.config.documents);
        }

        let server = LocalServer::start(self.config.server.clone()).await?;
        info!("Running {} test document(s)...", documents.len());

        let summary = self.run_documents(&server, documents).await;

        if let Err(e) = server.stop().await {
            warn!("Server did not stop cleanly: {}", e);
        }

        if let Err(e) = self.reporter.verdict(&summary) {
            warn!("Failed to print verdict: {}", e);
        }
        if let Some(path) = self.config.results_path.clone() {
            self.write_results(&summary, &path)?;
        }
        Ok(summary)
    }

    async fn run_documents(&mut self, server: &ServerHandle, documents: &[TestDocument]) -> RunSummary {
        let executor = DocumentExecutor::new(self.runner.clone(), self.config.deadline);
        let executor = &executor;

        // `buffered` yields in input order, so output follows enumeration
        // order even when documents overlap
        let mut outcomes = stream::iter(documents.iter().map(|document| {
            let url = server.url_for(&document.path).to_string();
            async move {
                let outcome = executor.run_document(document, &url).await;
                (document, url, outcome)
            }
        }))
        .buffered(self.config.concurrency.max(1));

        let mut summary = RunSummary::default();
        while let Some((document, url, outcome)) = outcomes.next().await {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    error!("✗ {} - {}", document.id(), e);
                    DocumentResult::aborted(document.id(), url, &e, Vec::new(), Duration::ZERO)
                }
            };
            if let Err(e) = self.reporter.document(&result) {
                warn!("Failed to print result for {}: {}", result.document, e);
            }
            summary.record(result);
        }
        summary
    }

    /// Write test results to a JSON file
    pub fn write_results(&self, summary: &RunSummary, path: &std::path::Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(path, json)?;

        info!("Results written to: {}", path.display());
        Ok(())
    }
}
