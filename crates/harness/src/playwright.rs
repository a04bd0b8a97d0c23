//! Playwright process runner
//!
//! Each test document gets its own Node.js driver process, which launches a
//! fresh browser, exposes the bridge functions, injects the completion hook
//! and navigates. The driver relays everything as NDJSON on stdout (see
//! [`crate::protocol`]).

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use deckhand_common::Browser;

use crate::error::{HarnessError, HarnessResult};
use crate::protocol::{decode_line, PageEvent};
use crate::session::{forward_console, PageSession, ProcessRunner};

const DRIVER_SOURCE: &str = include_str!("../js/page-driver.cjs");

/// Script injected into every test document
pub const HOOK_SOURCE: &str = include_str!("../js/completion-hook.js");

/// Time the driver gets to close its browser after stdin closes
const CLOSE_GRACE: Duration = Duration::from_secs(3);

/// Time between SIGTERM and a hard kill
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    /// Let pages read local files (Chromium only)
    pub allow_file_access: bool,
    /// Node.js executable
    pub node: String,
    /// Directory holding the `playwright` package
    pub node_modules: PathBuf,
    /// Deadline for the browser to come up
    pub launch_timeout: Duration,
    /// Deadline for the document's `load` event
    pub navigation_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            allow_file_access: true,
            node: "node".to_string(),
            node_modules: PathBuf::from("node_modules"),
            launch_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DriverConfig<'a> {
    url: &'a str,
    browser: &'static str,
    headless: bool,
    args: Vec<&'static str>,
    hook: &'static str,
    navigation_timeout_ms: u64,
}

/// Launches one Playwright driver per document
pub struct PlaywrightRunner {
    config: PlaywrightConfig,
    driver: tempfile::TempPath,
}

impl PlaywrightRunner {
    /// Stage the driver script and create a runner
    pub fn new(config: PlaywrightConfig) -> HarnessResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("deckhand-driver-")
            .suffix(".cjs")
            .tempfile()?;
        file.write_all(DRIVER_SOURCE.as_bytes())?;
        file.flush()?;

        Ok(Self {
            config,
            driver: file.into_temp_path(),
        })
    }

    /// Check if Playwright is installed
    pub async fn check_installed() -> HarnessResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::PlaywrightNotFound),
        }
    }

    /// Extra browser flags
    fn browser_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.config.browser == Browser::Chromium && self.config.allow_file_access {
            args.push("--allow-file-access-from-files");
        }
        args
    }

    fn driver_config(&self, url: &str) -> HarnessResult<String> {
        let config = DriverConfig {
            url,
            browser: self.config.browser.as_str(),
            headless: self.config.headless,
            args: self.browser_args(),
            hook: HOOK_SOURCE,
            navigation_timeout_ms: self.config.navigation_timeout.as_millis() as u64,
        };
        Ok(serde_json::to_string(&config)?)
    }

    fn node_path(&self) -> PathBuf {
        self.config
            .node_modules
            .canonicalize()
            .unwrap_or_else(|_| self.config.node_modules.clone())
    }
}

#[async_trait]
impl ProcessRunner for PlaywrightRunner {
    async fn launch(&self, url: &str) -> HarnessResult<Box<dyn PageSession>> {
        let mut cmd = Command::new(&self.config.node);
        cmd.arg(&*self.driver)
            .arg(self.driver_config(url)?)
            .env("NODE_PATH", self.node_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Launching {} driver for {}", self.config.browser, url);

        let child = cmd.spawn().map_err(|e| {
            HarnessError::Launch(format!("failed to spawn {}: {}", self.config.node, e))
        })?;
        let mut session = NodeSession::new(child)?;

        match timeout(self.config.launch_timeout, session.wait_ready()).await {
            Ok(Ok(())) => Ok(Box::new(session)),
            Ok(Err(e)) => {
                session.terminate().await;
                Err(e)
            }
            Err(_) => {
                session.terminate().await;
                Err(HarnessError::Launch(format!(
                    "browser did not start within {:?}",
                    self.config.launch_timeout
                )))
            }
        }
    }
}

/// One running driver process
pub struct NodeSession {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Lines<BufReader<ChildStdout>>,
    terminated: bool,
}

impl NodeSession {
    fn new(mut child: Child) -> HarnessResult<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Launch("driver stdout not captured".into()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[driver] {}", line);
                }
            });
        }

        Ok(Self {
            stdin: child.stdin.take(),
            lines: BufReader::new(stdout).lines(),
            child,
            terminated: false,
        })
    }

    async fn wait_ready(&mut self) -> HarnessResult<()> {
        loop {
            match self.next_event().await? {
                Some(PageEvent::Ready) => return Ok(()),
                Some(PageEvent::LaunchFailed { message }) => {
                    return Err(HarnessError::Launch(message))
                }
                Some(PageEvent::Console { level, text }) => forward_console(&level, &text),
                Some(other) => debug!("Ignoring {:?} before ready", other),
                None => {
                    return Err(HarnessError::Launch(
                        "driver exited before the browser was ready".into(),
                    ))
                }
            }
        }
    }
}

#[async_trait]
impl PageSession for NodeSession {
    async fn next_event(&mut self) -> HarnessResult<Option<PageEvent>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            match decode_line(&line)? {
                Some(event) => return Ok(Some(event)),
                None if !line.trim().is_empty() => debug!("[driver] {}", line.trim()),
                None => {}
            }
        }
    }

    async fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        // Closing stdin asks the driver to close its browser and exit
        drop(self.stdin.take());
        if timeout(CLOSE_GRACE, self.child.wait()).await.is_ok() {
            return;
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && timeout(TERM_GRACE, self.child.wait()).await.is_ok()
                {
                    return;
                }
            }
        }

        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill browser driver: {}", e);
        }
    }
}
