//! Invocation of external toolchain commands (bundler, style compiler, linter)

use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// A command line prefix such as `npx sass`, configured per task
#[derive(Debug, Clone)]
pub struct Tool {
    program: String,
    base_args: Vec<String>,
}

/// Captured result of one tool run
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Best diagnostic text the tool produced: stderr, falling back to stdout
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

impl Tool {
    /// Build a tool from a configured command line; `None` when it is empty
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, rest) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            base_args: rest.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool in `cwd` with extra arguments, optionally feeding stdin
    pub async fn run<I, S>(&self, cwd: &Path, args: I, stdin: Option<&[u8]>) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .args(args)
            .current_dir(cwd)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running {} {:?}", self.program, self.base_args);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ToolNotFound(self.program.clone()),
            _ => Error::Io(e),
        })?;

        // stdin is fed concurrently with draining stdout and stderr
        let feeder = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_vec();
                Some(tokio::spawn(async move {
                    // dropping the pipe afterwards closes stdin
                    pipe.write_all(&input).await
                }))
            }
            _ => None,
        };

        let output = child.wait_with_output().await?;
        if let Some(feeder) = feeder {
            match feeder.await {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(Error::Io(e)),
                Err(e) => debug!("stdin feeder for {} did not finish: {}", self.program, e),
                _ => {}
            }
        }
        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
