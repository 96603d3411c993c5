// Process table liveness probe
// reason: sysinfo for structured process enumeration instead of parsing `ps`
use async_trait::async_trait;
use std::path::PathBuf;
use sysinfo::{ProcessRefreshKind, System, UpdateKind};
use tracing::debug;

use kvmd_core::port::liveness_probe::{LivenessError, LivenessProbe};

/// Liveness probe that scans the OS process table
///
/// Matches any process whose command line contains the update script path,
/// e.g. `/bin/bash /opt/kvmd-updater/scripts/update`. Each scan builds a new
/// `System`, since a cached entry would keep a PID's pre-exec argv.
pub struct ProcessTableProbe {
    script_path: String,
}

impl ProcessTableProbe {
    /// Create a probe for `script_path`
    ///
    /// # Example
    /// ```ignore
    /// let probe = ProcessTableProbe::new("/opt/kvmd-updater/scripts/update");
    /// ```
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into().to_string_lossy().into_owned(),
        }
    }

    pub fn script_path(&self) -> &str {
        &self.script_path
    }
}

/// Substring match of `needle` against argv joined by spaces
fn command_line_matches(cmd: &[String], needle: &str) -> bool {
    !cmd.is_empty() && cmd.join(" ").contains(needle)
}

/// One full scan; blocking, reads /proc
fn scan(script_path: &str) -> Result<bool, LivenessError> {
    let mut sys = System::new();
    // Plain refresh_processes() leaves cmd() empty
    sys.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));

    let processes = sys.processes();
    // We are always in the table ourselves, so empty means unreadable
    if processes.is_empty() {
        return Err(LivenessError::ProcessTableUnavailable(
            "process table is empty".to_string(),
        ));
    }

    let matched = processes
        .iter()
        .find(|(_, process)| command_line_matches(process.cmd(), script_path));

    if let Some((pid, _)) = matched {
        debug!(pid = %pid, script = %script_path, "Updater process found");
        return Ok(true);
    }

    debug!(
        scanned = %processes.len(),
        script = %script_path,
        "Updater process not found"
    );
    Ok(false)
}

#[async_trait]
impl LivenessProbe for ProcessTableProbe {
    async fn is_update_running(&self) -> Result<bool, LivenessError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(LivenessError::ProcessTableUnavailable(
                "process enumeration not supported on this platform".to_string(),
            ));
        }

        let script_path = self.script_path.clone();
        tokio::task::spawn_blocking(move || scan(&script_path))
            .await
            .map_err(|e| LivenessError::ProcessTableUnavailable(format!("scan task failed: {e}")))?
    }
}
