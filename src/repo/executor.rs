//! External command execution

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output (lossy UTF-8)
    pub stdout: String,
    /// Standard error (lossy UTF-8)
    pub stderr: String,
    /// Whether the command exited with status 0
    pub success: bool,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    /// Failed output with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

/// Runs external commands against a working directory.
///
/// A non-zero exit is not an error at this level: it is reported through
/// [`CommandOutput::success`] so callers can decide whether the failure is
/// tolerable. `Err` is reserved for commands that could not run at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` in `cwd` and wait for it to finish
    async fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;
}

/// Executor backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            // output is parsed, keep it untranslated
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::CommandSpawn {
                command: render_command(program, args),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}

/// Render a command line for logs and error messages
pub fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
