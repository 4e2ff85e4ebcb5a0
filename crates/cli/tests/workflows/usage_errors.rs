//! Argument errors exit non-zero before anything is watched

use crate::common::TestProject;
use crate::dirwatch;
use anyhow::Result;

#[test]
fn test_no_arguments_prints_usage() -> Result<()> {
    let project = TestProject::new()?;

    let result = dirwatch!(project.root()).assert_failure()?;

    assert!(result.contains_stderr("Usage"), "stderr: {}", result.stderr);
    Ok(())
}

#[test]
fn test_missing_command_prints_usage() -> Result<()> {
    let project = TestProject::new()?;

    let result = dirwatch!(project.root(), "CREATE").assert_failure()?;

    assert!(result.contains_stderr("<COMMAND>"), "stderr: {}", result.stderr);
    Ok(())
}

#[test]
fn test_invalid_kind_lists_valid_kinds() -> Result<()> {
    let project = TestProject::new()?;

    let result = dirwatch!(project.root(), "FOO", "cmd").assert_failure()?;

    for kind in ["CREATE", "MODIFY", "DELETE"] {
        assert!(result.contains_stderr(kind), "missing {kind}: {}", result.stderr);
    }
    Ok(())
}

#[test]
fn test_lowercase_kind_is_rejected() -> Result<()> {
    let project = TestProject::new()?;

    let result = dirwatch!(project.root(), "modify", "build.sh").assert_failure()?;

    assert!(!result.success());
    assert!(result.duration.as_secs() < 5);
    Ok(())
}
