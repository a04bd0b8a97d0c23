//! Runs one test document to completion

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::model::{DocumentResult, TestDocument};
use crate::protocol::{PageEvent, RunFinished, TestReport};
use crate::session::{forward_console, PageSession, ProcessRunner};

/// Default per-document deadline
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Drives a fresh page environment through a single test document
pub struct DocumentExecutor {
    runner: Arc<dyn ProcessRunner>,
    deadline: Duration,
}

impl DocumentExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>, deadline: Duration) -> Self {
        Self { runner, deadline }
    }

    /// Run `document` at `url` and produce its result.
    ///
    /// Timeouts, navigation failures and early exits become failing
    /// results; only a launch failure is returned as an error. The page
    /// environment is terminated before this returns, on every path.
    pub async fn run_document(&self, document: &TestDocument, url: &str) -> HarnessResult<DocumentResult> {
        let id = document.id();
        debug!("Running {}", id);

        let mut session = self.runner.launch(url).await?;
        let started = Instant::now();
        let mut reports = Vec::new();

        let outcome = timeout(self.deadline, drive(session.as_mut(), &mut reports)).await;
        session.terminate().await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(Ok(finished)) => DocumentResult::from_finished(id, url, &finished, reports),
            Ok(Err(e)) => {
                warn!("{} did not finish: {}", id, e);
                DocumentResult::aborted(id, url, &e, reports, elapsed)
            }
            Err(_) => {
                let e = HarnessError::Timeout {
                    document: id.clone(),
                    after: self.deadline,
                };
                warn!("{}", e);
                DocumentResult::aborted(id, url, &e, reports, elapsed)
            }
        };
        Ok(result)
    }
}

/// Consume page events until the run-finished signal.
///
/// Failing test reports are appended to `reports` as they arrive, so the
/// caller keeps them even if this future is dropped at the deadline.
async fn drive(session: &mut dyn PageSession, reports: &mut Vec<TestReport>) -> HarnessResult<RunFinished> {
    while let Some(event) = session.next_event().await? {
        match event {
            PageEvent::Console { level, text } => forward_console(&level, &text),
            PageEvent::PageError { message } => warn!("[page error] {}", message),
            PageEvent::Loaded => debug!("Document loaded"),
            PageEvent::TestDone { report } => reports.push(report),
            PageEvent::Finished { context } => return Ok(context),
            PageEvent::NavigationFailed { status, message } => {
                return Err(HarnessError::Navigation { status, message })
            }
            PageEvent::LaunchFailed { message } => return Err(HarnessError::Launch(message)),
            PageEvent::Ready => debug!("Duplicate ready signal"),
        }
    }
    Err(HarnessError::RunnerExited)
}
