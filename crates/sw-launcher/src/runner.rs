//! Runner abstraction: how one command record is turned into a finished
//! process.
//!
//! The executor only needs "run this, tell me when and how it ended", so real
//! processes and in-process fakes are interchangeable behind
//! [`CommandRunner`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use sw_sweep::CommandRecord;
use sw_types::{ExecutionError, LaunchConfig, SwResult};
use tokio::process::Command;
use tracing::{debug, info};

/// Exit state of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitState {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitState {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a single command to completion.
///
/// An `Err` means the command could not be run at all; a command that ran and
/// exited non-zero is an `Ok` with a non-zero [`ExitState`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandRecord) -> SwResult<ExitState>;

    /// Human-readable runner name.
    fn name(&self) -> &str;
}

/// Spawns each command as an OS process and waits for it.
///
/// No timeout and no kill on drop: once spawned, a process runs to its own
/// exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            working_dir: config.working_dir.clone(),
            log_dir: config.log_dir.clone(),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Log file a run writes to, if a log directory is configured.
    pub fn log_path(&self, run_name: &str) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("{run_name}.log")))
    }

    fn redirect_to_log(cmd: &mut Command, path: &Path) -> Result<(), ExecutionError> {
        let log_error = |e: std::io::Error| ExecutionError::LogFile {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(log_error)?;
        }
        let stdout = std::fs::File::create(path).map_err(log_error)?;
        let stderr = stdout.try_clone().map_err(log_error)?;

        cmd.stdout(Stdio::from(stdout));
        cmd.stderr(Stdio::from(stderr));
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandRecord) -> SwResult<ExitState> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        if let Some(path) = self.log_path(&command.run_name) {
            Self::redirect_to_log(&mut cmd, &path)?;
        }

        let mut child = cmd.spawn().map_err(|e| ExecutionError::SpawnFailed {
            run_name: command.run_name.clone(),
            message: e.to_string(),
        })?;

        debug!(run_name = %command.run_name, pid = ?child.id(), "process spawned");

        let status = child.wait().await.map_err(|e| ExecutionError::WaitFailed {
            run_name: command.run_name.clone(),
            message: e.to_string(),
        })?;

        Ok(ExitState {
            code: status.code(),
        })
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Logs each command instead of running it. Every run reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &CommandRecord) -> SwResult<ExitState> {
        info!(run_name = %command.run_name, command = %command, "dry run");
        Ok(ExitState::success())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
