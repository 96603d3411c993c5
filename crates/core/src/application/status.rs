// Update status derivation
use std::sync::Arc;
use tracing::debug;

use crate::domain::StatusReport;
use crate::error::Result;
use crate::port::{LivenessProbe, ResultStore};

/// Status oracle
///
/// Combines the process table and the result store into a three-state
/// answer. Holds no state of its own, so any number of independent
/// requests may query it concurrently.
pub struct StatusOracle {
    probe: Arc<dyn LivenessProbe>,
    store: Arc<dyn ResultStore>,
}

impl StatusOracle {
    pub fn new(probe: Arc<dyn LivenessProbe>, store: Arc<dyn ResultStore>) -> Self {
        Self { probe, store }
    }

    /// Derive the current update status
    ///
    /// Liveness is checked before the store: while the updater is still in
    /// the process table, any stored result predates the current run, even
    /// one written a moment ago.
    ///
    /// # Errors
    /// - AppError::Liveness if the process table cannot be scanned
    /// - Store errors from ResultStore::read
    pub async fn get_status(&self) -> Result<StatusReport> {
        if self.probe.is_update_running().await? {
            debug!("Updater present in process table");
            return Ok(StatusReport::in_progress());
        }

        let report = match self.store.read().await? {
            None => StatusReport::not_running(),
            Some(result) => StatusReport::done(result.into_error()),
        };

        debug!(status = %report.status, error = ?report.error, "Update status derived");
        Ok(report)
    }
}
