//! External command execution

use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// A fully built external command: program, argument list and working directory
///
/// Arguments are kept as a list and passed to the process as-is, never
/// through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<OsString>,
    /// Working directory (inherits the caller's when None)
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    /// Start building a command for `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command from `dir`
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[must_use]
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

/// Trait for running external tools
///
/// The release pipeline builds [`ToolCommand`]s and hands them to a runner;
/// swapping the runner is how test mode and unit tests avoid touching real
/// binaries.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExternalTool`] if the process cannot be spawned.
    /// A process that runs but exits non-zero is reported through
    /// [`CommandOutput::success`], not as an error.
    async fn run(&self, command: &ToolCommand) -> crate::Result<CommandOutput>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Runs commands as child processes
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> crate::Result<CommandOutput> {
        info!(%command, cwd = ?command.cwd, "executing command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(cwd) = &command.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output().await.map_err(|e| {
            crate::Error::ExternalTool(format!(
                "Failed to execute {}: {}",
                command.program.display(),
                e
            ))
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!(output = %combined, "command output");

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: combined,
        })
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Logs commands without executing them
///
/// Selected by `release.test_mode`; every command reports success.
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &ToolCommand) -> crate::Result<CommandOutput> {
        info!(%command, cwd = ?command.cwd, "test mode, not executing command");
        Ok(CommandOutput {
            success: true,
            exit_code: Some(0),
            output: String::new(),
        })
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
