//! Shell command handler
//!
//! Runs `./<command> <file-name>` through `sh -c`, synchronously, with the
//! watcher's environment and standard streams. The exit status is only logged.

use std::ffi::{OsStr, OsString};
use std::process::Command;
use watcher::{EventHandler, EventKind};

/// Handler that launches a user command for each event
#[derive(Debug, Clone)]
pub struct ShellCommand {
    program: String,
}

impl ShellCommand {
    /// `command` is resolved relative to the current directory
    pub fn new(command: &str) -> Self {
        Self {
            program: format!("./{command}"),
        }
    }

    /// Full shell line for `name`
    pub fn command_line(&self, name: &OsStr) -> OsString {
        let mut line = OsString::from(&self.program);
        line.push(" ");
        line.push(name);
        line
    }
}

impl EventHandler for ShellCommand {
    fn name(&self) -> &str {
        &self.program
    }

    fn handle(&mut self, kind: EventKind, name: &OsStr) {
        let line = self.command_line(name);
        tracing::debug!("{}: sh -c {:?}", kind, line);

        match Command::new("sh").arg("-c").arg(&line).status() {
            Ok(status) => tracing::debug!("{:?} exited with {}", line, status),
            Err(e) => tracing::debug!("Failed to launch {:?}: {}", line, e),
        }
    }
}
