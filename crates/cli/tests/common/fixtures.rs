//! Test project fixtures
//!
//! A `TestProject` is a watched working directory plus a separate output
//! directory. Scripts installed into the project append their first
//! argument to a log in the output directory, so the log itself never
//! generates events in the watched directory.

use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    work: TempDir,
    out: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        Ok(Self {
            work: TempDir::new()?,
            out: TempDir::new()?,
        })
    }

    /// Watched directory, used as the watcher's working directory
    pub fn root(&self) -> &Path {
        self.work.path()
    }

    /// Log written by the script named `script`
    pub fn log_path(&self, script: &str) -> PathBuf {
        self.out.path().join(format!("{script}.log"))
    }

    /// Install an executable script that records each invocation
    pub fn install_recorder(&self, script: &str) -> Result<PathBuf> {
        let path = self.work.path().join(script);
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$1\" >> '{}'\n",
            self.log_path(script).display()
        );
        fs::write(&path, body)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// Write a file inside the watched directory
    pub fn write(&self, name: &str, contents: &str) -> Result<()> {
        fs::write(self.work.path().join(name), contents)?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        fs::remove_file(self.work.path().join(name))?;
        Ok(())
    }
}
