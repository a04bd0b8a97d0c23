//! Error types for the test harness

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser failed to launch: {0}")]
    Launch(String),

    #[error("Navigation failed: {message}")]
    Navigation { status: Option<u16>, message: String },

    #[error("Timed out after {after:?} waiting for {document} to finish")]
    Timeout { document: String, after: Duration },

    #[error("Browser process exited before the test run finished")]
    RunnerExited,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{failed}/{total} tests failed")]
    SuiteFailed { failed: u64, total: u64 },

    #[error("Discovery error: {0}")]
    Discovery(#[from] deckhand_common::Error),

    #[error("Server error: {0}")]
    Server(#[from] deckhand_server::ServerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
