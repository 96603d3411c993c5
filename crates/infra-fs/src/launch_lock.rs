// Advisory launch lock
// reason: fs2 for flock(LOCK_EX | LOCK_NB), released by the kernel if we crash
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use kvmd_core::error::{AppError, Result};
use kvmd_core::port::{LaunchGuard, LaunchLock};

/// Default lock file name inside the state directory
pub const LOCK_FILENAME: &str = "update-launch.lock";

/// flock-based launch lock
///
/// flock locks belong to the open file description, so two opens of the
/// same path conflict whether they come from different processes or from
/// different threads of one process.
pub struct FlockLaunchLock {
    path: PathBuf,
}

impl FlockLaunchLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lock at `<state_dir>/update-launch.lock`
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        Self::new(state_dir.as_ref().join(LOCK_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::fs(parent, e))?;
        }
        // No truncate before the lock is ours, it would wipe the holder's PID
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| AppError::fs(&self.path, e))
    }
}

impl LaunchLock for FlockLaunchLock {
    fn try_acquire(&self) -> Result<Option<LaunchGuard>> {
        let mut file = self.open()?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!(path = %self.path.display(), "Launch lock contended");
                return Ok(None);
            }
            Err(e) => return Err(AppError::fs(&self.path, e)),
        }

        // PID for diagnostics only
        file.set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .map_err(|e| AppError::fs(&self.path, e))?;

        debug!(path = %self.path.display(), "Launch lock acquired");
        Ok(Some(LaunchGuard::new(file)))
    }
}
