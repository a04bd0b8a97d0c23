//! deckhand test harness
//!
//! Runs the QUnit test documents of a presentation in headless browsers
//! and folds their results into one verdict.
//!
//! The pieces, bottom up:
//! - [`protocol`]: the envelopes a page environment emits
//! - [`session`]: the [`ProcessRunner`] seam and its [`PageSession`]s
//! - [`playwright`]: the production runner, one Node.js driver per document
//! - [`executor`]: drives one document to a [`DocumentResult`]
//! - [`runner`]: serves the tree, runs every document, builds the [`RunSummary`]

pub mod error;
pub mod executor;
pub mod model;
pub mod playwright;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod session;

pub use error::{HarnessError, HarnessResult};
pub use executor::{DocumentExecutor, DEFAULT_DEADLINE};
pub use model::{discover, DocumentResult, RunSummary, TestDocument};
pub use playwright::{PlaywrightConfig, PlaywrightRunner};
pub use protocol::{AssertionFailure, PageEvent, RunFinished, TestReport};
pub use report::Reporter;
pub use runner::{SuiteConfig, SuiteRunner};
pub use session::{PageSession, ProcessRunner};
