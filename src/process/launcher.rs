//! Process launch

use crate::common::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;

/// What to start and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Arguments as a single space-separated string, for logs and checks
    pub fn argument_string(&self) -> String {
        self.args.join(" ")
    }
}

/// Starts the managed process and immediately lets go of it
pub trait ProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<()>;
}

/// Spawns directly (no shell) via `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<()> {
        let child = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| Error::LaunchFailed {
                program: spec.program.clone(),
                source,
            })?;

        tracing::info!(
            program = %spec.program.display(),
            args = %spec.argument_string(),
            cwd = %spec.working_dir.display(),
            pid = ?child.id(),
            "managed process started"
        );
        // Dropping the handle detaches the child; it outlives this call.
        drop(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_launch_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let spec = LaunchSpec {
            program: dir.path().join("no-such-server"),
            working_dir: dir.path().to_path_buf(),
            args: vec!["redis.conf".to_string()],
        };
        match TokioLauncher.launch(&spec) {
            Err(Error::LaunchFailed { program, .. }) => assert_eq!(program, spec.program),
            other => panic!("expected launch failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_runs_in_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let spec = LaunchSpec {
            program: PathBuf::from("/bin/sh"),
            working_dir: dir.path().to_path_buf(),
            args: vec!["-c".to_string(), "echo started > marker".to_string()],
        };
        TokioLauncher.launch(&spec).unwrap();

        let marker = dir.path().join("marker");
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(marker.exists());
    }
}
