//! Human-readable suite output

use std::io::{self, Write};

use colored::Colorize;

use crate::error::HarnessResult;
use crate::model::{DocumentResult, RunSummary};

/// Render one document's outcome.
///
/// Passing documents get a single line; failing ones list every failing
/// test with each assertion's message, expected and actual values.
pub fn render_document(result: &DocumentResult) -> String {
    if result.is_success() {
        return format!(
            "{} {}: {}/{} passed ({} ms)\n",
            "✓".green(),
            result.document,
            result.passed(),
            result.total,
            result.runtime_ms
        );
    }

    let mut out = format!(
        "{} {}: {}/{} passed, {} failed ({} ms)\n",
        "✗".red(),
        result.document,
        result.passed(),
        result.total,
        result.failed,
        result.runtime_ms
    );

    if let Some(error) = &result.error {
        out.push_str(&format!("    error: {}\n", error));
    }

    for report in &result.reports {
        let title = if report.module.is_empty() {
            report.name.clone()
        } else {
            format!("{} > {}", report.module, report.name)
        };
        out.push_str(&format!(
            "    {} ({}/{} failed)\n",
            title, report.failed, report.total
        ));
        for assertion in &report.assertions {
            let message = if assertion.message.is_empty() {
                "(no message)"
            } else {
                assertion.message.as_str()
            };
            out.push_str(&format!("      {}\n", message));
            if let Some(expected) = &assertion.expected {
                out.push_str(&format!("        expected: {}\n", expected));
            }
            if let Some(actual) = &assertion.actual {
                out.push_str(&format!("        actual:   {}\n", actual));
            }
        }
    }
    out
}

/// Render the closing line for a finished suite
pub fn render_verdict(summary: &RunSummary) -> String {
    match summary.verdict() {
        Ok(message) => format!("{}\n", message.green().bold()),
        Err(e) => format!("{}\n", e.to_string().red().bold()),
    }
}

/// Writes suite output as results arrive
pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn document(&mut self, result: &DocumentResult) -> HarnessResult<()> {
        self.out.write_all(render_document(result).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn verdict(&mut self, summary: &RunSummary) -> HarnessResult<()> {
        self.out.write_all(b"\n")?;
        self.out.write_all(render_verdict(summary).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::protocol::{AssertionFailure, RunFinished, TestReport};
    use std::sync::Once;
    use std::time::Duration;

    static PLAIN: Once = Once::new();

    /// Colour is process-wide; every test in this binary wants it off
    fn plain() {
        PLAIN.call_once(|| colored::control::set_override(false));
    }

    #[test]
    fn test_passing_document_is_one_line() {
        plain();
        let finished = RunFinished { failed: 0, passed: 5, total: 5, runtime: 87 };
        let result = DocumentResult::from_finished("test/test.html", "u", &finished, vec![]);
        assert_eq!(render_document(&result), "✓ test/test.html: 5/5 passed (87 ms)\n");
    }

    #[test]
    fn test_failing_document_lists_assertions() {
        plain();
        let finished = RunFinished { failed: 2, passed: 3, total: 5, runtime: 120 };
        let reports = vec![TestReport {
            name: "Reveal.slide".into(),
            module: "Navigation".into(),
            failed: 2,
            total: 3,
            assertions: vec![
                AssertionFailure {
                    message: "indexh".into(),
                    expected: Some("2".into()),
                    actual: Some("1".into()),
                },
                AssertionFailure {
                    message: String::new(),
                    expected: None,
                    actual: Some("undefined".into()),
                },
            ],
        }];
        let result = DocumentResult::from_finished("test/test.html", "u", &finished, reports);

        let expected = "\
✗ test/test.html: 3/5 passed, 2 failed (120 ms)
    Navigation > Reveal.slide (2/3 failed)
      indexh
        expected: 2
        actual:   1
      (no message)
        actual:   undefined
";
        assert_eq!(render_document(&result), expected);
    }

    #[test]
    fn test_aborted_document_shows_error() {
        plain();
        let err = HarnessError::Timeout {
            document: "test/slow.html".into(),
            after: Duration::from_secs(60),
        };
        let result = DocumentResult::aborted("test/slow.html", "u", &err, vec![], Duration::from_secs(60));
        let text = render_document(&result);
        assert!(text.starts_with("✗ test/slow.html: 0/1 passed, 1 failed"));
        assert!(text.contains("error: Timed out after 60s waiting for test/slow.html to finish"));
    }

    #[test]
    fn test_verdict_lines() {
        plain();
        let mut summary = RunSummary::default();
        let ok = RunFinished { failed: 0, passed: 4, total: 4, runtime: 1 };
        summary.record(DocumentResult::from_finished("a.html", "u", &ok, vec![]));
        assert_eq!(render_verdict(&summary), "Passed 4 tests\n");

        let bad = RunFinished { failed: 2, passed: 3, total: 5, runtime: 1 };
        summary.record(DocumentResult::from_finished("b.html", "u", &bad, vec![]));
        assert_eq!(render_verdict(&summary), "2/9 tests failed\n");
    }
}
