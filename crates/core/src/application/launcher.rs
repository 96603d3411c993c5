// Update launcher - the only mutation entry point of the update subsystem
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::constants::{SETTLE_POLL_INTERVAL, SETTLE_TIMEOUT};
use crate::application::status::StatusOracle;
use crate::domain::UpdateStatus;
use crate::error::{AppError, Result};
use crate::port::{LaunchLock, LivenessProbe, ProcessLauncher, ResultStore};

/// How long to wait for a spawned updater to show up in the process table
#[derive(Debug, Clone, Copy)]
pub struct SettleConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            poll_interval: SETTLE_POLL_INTERVAL,
            timeout: SETTLE_TIMEOUT,
        }
    }
}

/// Update launcher
///
/// Tracks no running state of its own; every call re-derives liveness from
/// the OS. Concurrent starts are serialized by the launch lock, which stays
/// held until the new updater is visible to the liveness probe, so a second
/// caller can never observe the gap between spawn and process-table entry.
pub struct UpdateLauncher {
    oracle: StatusOracle,
    probe: Arc<dyn LivenessProbe>,
    store: Arc<dyn ResultStore>,
    process_launcher: Arc<dyn ProcessLauncher>,
    lock: Arc<dyn LaunchLock>,
    settle: SettleConfig,
}

impl UpdateLauncher {
    /// Create a new launcher
    ///
    /// # Arguments
    /// * `probe` - Liveness probe shared with status queries
    /// * `store` - Result store cleared before each run
    /// * `process_launcher` - Detached spawner for the updater
    /// * `lock` - Single-instance launch lock
    ///
    /// # Example
    /// ```ignore
    /// let launcher = UpdateLauncher::new(probe, store, service_launcher, lock);
    /// launcher.start().await?;
    /// ```
    pub fn new(
        probe: Arc<dyn LivenessProbe>,
        store: Arc<dyn ResultStore>,
        process_launcher: Arc<dyn ProcessLauncher>,
        lock: Arc<dyn LaunchLock>,
    ) -> Self {
        Self {
            oracle: StatusOracle::new(probe.clone(), store.clone()),
            probe,
            store,
            process_launcher,
            lock,
            settle: SettleConfig::default(),
        }
    }

    pub fn with_settle(mut self, settle: SettleConfig) -> Self {
        self.settle = settle;
        self
    }

    /// Start an update asynchronously
    ///
    /// Returns as soon as the spawn is accepted; it does not wait for the
    /// update to finish.
    ///
    /// # Errors
    /// - AppError::AlreadyInProgress if an update is running or another
    ///   caller is mid-launch. Nothing is mutated in that case.
    /// - AppError::Liveness if liveness cannot be determined
    /// - AppError::Launch if the spawn is rejected
    pub async fn start(&self) -> Result<()> {
        let Some(_guard) = self.lock.try_acquire()? else {
            info!("Launch lock held by another caller, refusing start");
            return Err(AppError::AlreadyInProgress);
        };

        let report = self.oracle.get_status().await?;
        if report.status == UpdateStatus::InProgress {
            info!("Update already in progress, refusing start");
            return Err(AppError::AlreadyInProgress);
        }

        // Any previous result, DONE included, is invalid once a new run begins
        self.store.clear().await?;

        self.process_launcher.spawn_detached().await?;
        info!(previous_status = %report.status, "Update process launched");

        self.wait_until_visible().await;
        Ok(())
    }

    /// Poll the probe until the new updater appears or the window closes.
    /// The spawn has already been accepted, so failures here only warn.
    async fn wait_until_visible(&self) {
        let deadline = tokio::time::Instant::now() + self.settle.timeout;

        loop {
            match self.probe.is_update_running().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Liveness check failed while settling launch");
                    return;
                }
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(
                    timeout_ms = %self.settle.timeout.as_millis(),
                    "Updater not yet visible in process table, releasing launch lock"
                );
                return;
            }
            tokio::time::sleep(self.settle.poll_interval).await;
        }
    }
}
