//! Process runner seam: something that can open a page and stream its events

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::HarnessResult;
use crate::protocol::PageEvent;

/// Launches isolated page environments, one per test document
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Start a fresh environment for `url`.
    ///
    /// Resolves once the environment is up and the bridge functions are
    /// registered, before the document starts loading. Errors here mean the
    /// environment could not be started at all.
    async fn launch(&self, url: &str) -> HarnessResult<Box<dyn PageSession>>;
}

/// A running page environment
#[async_trait]
pub trait PageSession: Send {
    /// Next event from the page; `Ok(None)` once the environment has exited
    async fn next_event(&mut self) -> HarnessResult<Option<PageEvent>>;

    /// Shut the environment down. Safe to call more than once.
    async fn terminate(&mut self);
}

/// Relay a page console message to the host log. Never fails.
pub fn forward_console(level: &str, text: &str) {
    match level {
        "error" | "assert" | "warning" | "warn" => warn!("[console] {}", text),
        _ => info!("[console] {}", text),
    }
}
