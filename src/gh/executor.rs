//! Command execution abstraction
//!
//! Provides a trait for running `gh` so the runner can be driven by a real
//! process or by a fake in tests.

use crate::config::schema::GhConfig;
use crate::error::{GhmError, GhmResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs `gh` with the given arguments
///
/// A non-zero exit must be reported as an error so callers can tell
/// success from failure.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, args: &[String]) -> GhmResult<CommandOutput>;
}

/// `gh` binary invoked as a child process
pub struct GhCli {
    binary: String,
    host: Option<String>,
}

impl GhCli {
    pub fn new(config: &GhConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            host: config.host.clone(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }
}

#[async_trait]
impl CommandExecutor for GhCli {
    async fn execute(&self, args: &[String]) -> GhmResult<CommandOutput> {
        let command = self.describe(args);
        debug!("Running: {}", command);

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(host) = &self.host {
            cmd.env("GH_HOST", host);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| GhmError::command_failed(&command, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(GhmError::command_exec(command, stderr.trim()));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
