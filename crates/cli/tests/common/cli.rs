//! CLI command execution helpers with automatic timing
//!
//! This module provides a wrapper around the `dirwatch` binary that
//! measures execution time for one-shot invocations and manages the
//! long-running watch process for end-to-end scenarios.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Time given to a freshly spawned watcher to register its watch
pub const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// CLI command builder with timing
pub struct DirwatchCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
}

impl DirwatchCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_dirwatch")),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command.args(&self.args).current_dir(&self.working_dir);
        command
    }

    /// Execute a command expected to exit on its own
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }

    /// Start a long-running watcher and wait for it to settle
    pub fn spawn(&self) -> Result<WatchProcess> {
        let child = self
            .command()
            .stdin(Stdio::null())
            .spawn()
            .context("Failed to spawn watcher")?;
        thread::sleep(STARTUP_GRACE);
        Ok(WatchProcess { child })
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// A running watcher, killed on drop
pub struct WatchProcess {
    child: Child,
}

impl WatchProcess {
    /// Whether the process is still running
    pub fn is_running(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_none())
    }

    /// Send SIGTERM and wait for the process to exit
    pub fn terminate(mut self, timeout: Duration) -> Result<ExitStatus> {
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(self.child.id().to_string())
            .status()
            .context("Failed to run kill")?;
        anyhow::ensure!(status.success(), "kill -TERM failed");

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(Duration::from_millis(20));
        }
        anyhow::bail!("Watcher did not exit within {:?}", timeout)
    }
}

impl Drop for WatchProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Poll `path` until it holds at least `count` lines or `timeout` passes
pub fn wait_for_lines(path: &Path, count: usize, timeout: Duration) -> Vec<String> {
    let deadline = Instant::now() + timeout;
    loop {
        let lines = read_lines(path);
        if lines.len() >= count || Instant::now() >= deadline {
            return lines;
        }
        thread::sleep(Duration::from_millis(20));
    }
}

/// Lines of `path`, empty if it does not exist yet
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Macro for convenient command construction
///
/// Usage:
/// ```
/// dirwatch!(dir, "CREATE", "notify.sh").spawn()?;
/// ```
#[macro_export]
macro_rules! dirwatch {
    ($dir:expr $(, $arg:expr)*) => {{
        let mut cmd = $crate::common::cli::DirwatchCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
