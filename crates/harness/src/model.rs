//! Test documents, per-document results and the suite-wide summary

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use deckhand_common::paths;

use crate::error::{HarnessError, HarnessResult};
use crate::protocol::{RunFinished, TestReport};

/// One executable test page, relative to the server root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDocument {
    pub path: PathBuf,
}

impl TestDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Identifier used in reports
    pub fn id(&self) -> String {
        paths::to_slash(&self.path)
    }
}

/// Enumerate test documents under `root` matching `pattern`, in sorted order
pub fn discover(root: &Path, pattern: &str) -> HarnessResult<Vec<TestDocument>> {
    Ok(paths::expand(root, pattern)?
        .into_iter()
        .map(TestDocument::new)
        .collect())
}

/// Outcome of one test document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document: String,
    pub url: String,
    pub total: u32,
    pub failed: u32,
    pub runtime_ms: u64,
    /// Tests with failures, in the order the page finished them
    pub reports: Vec<TestReport>,
    /// Why the document did not finish normally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub timed_out: bool,
}

impl DocumentResult {
    /// Result built from the page's own completion signal
    pub fn from_finished(
        document: impl Into<String>,
        url: impl Into<String>,
        finished: &RunFinished,
        reports: Vec<TestReport>,
    ) -> Self {
        Self {
            document: document.into(),
            url: url.into(),
            // keep failed <= total even if the page miscounts
            total: finished.total.max(finished.failed),
            failed: finished.failed,
            runtime_ms: finished.runtime,
            reports,
            error: None,
            timed_out: false,
        }
    }

    /// Result for a document that never finished.
    ///
    /// Counts as a full failure: every check seen so far failed, and at least
    /// one check is recorded so the document can never read as passing.
    pub fn aborted(
        document: impl Into<String>,
        url: impl Into<String>,
        error: &HarnessError,
        reports: Vec<TestReport>,
        elapsed: Duration,
    ) -> Self {
        let seen: u32 = reports.iter().map(|r| r.total).sum();
        let total = seen.max(1);
        Self {
            document: document.into(),
            url: url.into(),
            total,
            failed: total,
            runtime_ms: elapsed.as_millis() as u64,
            reports,
            error: Some(error.to_string()),
            timed_out: matches!(error, HarnessError::Timeout { .. }),
        }
    }

    pub fn passed(&self) -> u32 {
        self.total - self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.error.is_none()
    }
}

/// Suite-wide totals plus every document result, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: u64,
    pub failed: u64,
    pub documents: Vec<DocumentResult>,
}

impl RunSummary {
    /// Fold one document into the totals
    pub fn record(&mut self, result: DocumentResult) {
        self.total += u64::from(result.total);
        self.failed += u64::from(result.failed);
        self.documents.push(result);
    }

    pub fn passed(&self) -> u64 {
        self.total - self.failed
    }

    /// Suite verdict: `Ok("Passed N tests")` or `SuiteFailed` ("F/T tests failed")
    pub fn verdict(&self) -> HarnessResult<String> {
        if self.failed > 0 {
            Err(HarnessError::SuiteFailed {
                failed: self.failed,
                total: self.total,
            })
        } else {
            Ok(format!("Passed {} tests", self.total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AssertionFailure;

    fn finished(failed: u32, total: u32) -> RunFinished {
        RunFinished {
            failed,
            passed: total - failed,
            total,
            runtime: 10,
        }
    }

    fn report(total: u32) -> TestReport {
        TestReport {
            name: "slide sync".into(),
            module: "API".into(),
            failed: 1,
            total,
            assertions: vec![AssertionFailure {
                message: "index".into(),
                expected: Some("1".into()),
                actual: Some("0".into()),
            }],
        }
    }

    #[test]
    fn test_summary_totals_are_sums() {
        let mut summary = RunSummary::default();
        summary.record(DocumentResult::from_finished("a.html", "u", &finished(2, 5), vec![]));
        summary.record(DocumentResult::from_finished("b.html", "u", &finished(0, 4), vec![]));

        assert_eq!(summary.total, 9);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.passed(), 7);
        let err = summary.verdict().unwrap_err();
        assert_eq!(err.to_string(), "2/9 tests failed");
    }

    #[test]
    fn test_passing_verdict() {
        let mut summary = RunSummary::default();
        for name in ["a.html", "b.html", "c.html"] {
            summary.record(DocumentResult::from_finished(name, "u", &finished(0, 5), vec![]));
        }
        assert_eq!(summary.verdict().unwrap(), "Passed 15 tests");
    }

    #[test]
    fn test_empty_suite_passes() {
        assert_eq!(RunSummary::default().verdict().unwrap(), "Passed 0 tests");
    }

    #[test]
    fn test_failed_never_exceeds_total() {
        let result = DocumentResult::from_finished("a.html", "u", &finished(0, 0), vec![]);
        assert_eq!((result.failed, result.total), (0, 0));

        let inconsistent = RunFinished { failed: 4, passed: 0, total: 2, runtime: 1 };
        let result = DocumentResult::from_finished("a.html", "u", &inconsistent, vec![]);
        assert!(result.failed <= result.total);
    }

    #[test]
    fn test_aborted_without_reports_is_one_failure() {
        let err = HarnessError::RunnerExited;
        let result = DocumentResult::aborted("a.html", "u", &err, vec![], Duration::from_millis(5));
        assert_eq!((result.failed, result.total), (1, 1));
        assert!(!result.is_success());
        assert!(!result.timed_out);
    }

    #[test]
    fn test_timeout_counts_every_seen_check() {
        let err = HarnessError::Timeout {
            document: "a.html".into(),
            after: Duration::from_secs(60),
        };
        let result = DocumentResult::aborted("a.html", "u", &err, vec![report(3), report(2)], Duration::from_secs(60));
        assert_eq!((result.failed, result.total), (5, 5));
        assert!(result.timed_out);
        assert_eq!(result.reports.len(), 2);
    }

    #[test]
    fn test_discover_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("test")).unwrap();
        for name in ["test-pdf.html", "test.html", "test-markdown.html", "qunit.js"] {
            std::fs::write(dir.path().join("test").join(name), "").unwrap();
        }

        let ids: Vec<String> = discover(dir.path(), "test/*.html")
            .unwrap()
            .iter()
            .map(TestDocument::id)
            .collect();
        assert_eq!(ids, vec!["test/test-markdown.html", "test/test-pdf.html", "test/test.html"]);
    }
}
