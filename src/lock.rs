//! Advisory data-directory lock.
//!
//! Two concurrent runs against the same data directory would interleave
//! writes through separate embedded-database connections, so a run holds a
//! lock file for its whole duration. The lock is advisory: it guards against
//! accidental double invocation (e.g. overlapping cron runs), not against
//! hostile processes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

const LOCK_FILE_NAME: &str = ".leaderboard.lock";

/// Guard holding the data-directory lock; released on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquire the lock, failing if another run already holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, PipelineError> {
        let path = data_dir.join(LOCK_FILE_NAME);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // PID recorded for stale-lock diagnosis only
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(PipelineError::Locked {
                    path: data_dir.to_path_buf(),
                })
            }
            Err(err) => Err(PipelineError::Io(err)),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to remove lock file {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();

        let lock = RunLock::acquire(dir.path()).unwrap();
        let second = RunLock::acquire(dir.path());
        assert!(matches!(second, Err(PipelineError::Locked { .. })));

        drop(lock);
        let third = RunLock::acquire(dir.path());
        assert!(third.is_ok());
    }
}
