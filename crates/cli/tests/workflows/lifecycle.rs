//! Startup and shutdown of the watch process

use crate::common::TestProject;
use crate::dirwatch;
use anyhow::Result;
use std::time::Duration;

#[test]
fn test_watcher_keeps_running_without_events() -> Result<()> {
    let project = TestProject::new()?;
    project.install_recorder("notify.sh")?;

    let mut watcher = dirwatch!(project.root(), "CREATE", "notify.sh").spawn()?;

    assert!(watcher.is_running()?);
    Ok(())
}

#[test]
fn test_sigterm_stops_cleanly() -> Result<()> {
    let project = TestProject::new()?;
    project.install_recorder("notify.sh")?;

    let watcher = dirwatch!(project.root(), "CREATE", "notify.sh").spawn()?;
    let status = watcher.terminate(Duration::from_secs(5))?;

    assert!(status.success(), "exit status: {status}");
    Ok(())
}
