//! RPC Method Handlers
//!
//! Thin mapping from JSON-RPC methods onto the update use cases.

use crate::error::to_rpc_error;
use crate::types::{StartUpdateResponse, StatusResponse};
use jsonrpsee::types::ErrorObjectOwned;
use kvmd_core::application::{StatusOracle, UpdateLauncher};
use std::sync::Arc;
use tracing::warn;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    launcher: Arc<UpdateLauncher>,
    oracle: Arc<StatusOracle>,
}

impl RpcHandler {
    pub fn new(launcher: Arc<UpdateLauncher>, oracle: Arc<StatusOracle>) -> Self {
        Self { launcher, oracle }
    }

    /// update.start.v1
    pub async fn start(&self) -> Result<StartUpdateResponse, ErrorObjectOwned> {
        self.launcher.start().await.map_err(|e| {
            warn!(error = %e, "Update start rejected");
            to_rpc_error(e)
        })?;

        Ok(StartUpdateResponse { started: true })
    }

    /// update.status.v1
    pub async fn status(&self) -> Result<StatusResponse, ErrorObjectOwned> {
        let report = self.oracle.get_status().await.map_err(|e| {
            warn!(error = %e, "Update status unavailable");
            to_rpc_error(e)
        })?;

        Ok(report.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use chrono::Utc;
    use kvmd_core::domain::{UpdateResult, UpdateStatus};
    use kvmd_core::port::launch_lock::mocks::MockLaunchLock;
    use kvmd_core::port::liveness_probe::mocks::MockLivenessProbe;
    use kvmd_core::port::process_launcher::mocks::MockProcessLauncher;
    use kvmd_core::port::result_store::mocks::MockResultStore;

    fn handler(probe: Arc<MockLivenessProbe>, store: Arc<MockResultStore>) -> RpcHandler {
        let spawner = Arc::new(MockProcessLauncher::new().marks_running(probe.clone()));
        let launcher = UpdateLauncher::new(
            probe.clone(),
            store.clone(),
            spawner,
            Arc::new(MockLaunchLock::new()),
        );
        RpcHandler::new(Arc::new(launcher), Arc::new(StatusOracle::new(probe, store)))
    }

    #[tokio::test]
    async fn test_status_reports_done_error() {
        let store = Arc::new(MockResultStore::with_result(UpdateResult::failure(
            "disk full",
            Utc::now(),
        )));
        let h = handler(Arc::new(MockLivenessProbe::not_running()), store);

        let response = h.status().await.unwrap();
        assert_eq!(response.status, UpdateStatus::Done);
        assert_eq!(response.update_error.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_start_then_start_again_conflicts() {
        let h = handler(
            Arc::new(MockLivenessProbe::not_running()),
            Arc::new(MockResultStore::new()),
        );

        assert!(h.start().await.unwrap().started);
        let err = h.start().await.unwrap_err();
        assert_eq!(err.code(), code::CONFLICT);

        let response = h.status().await.unwrap();
        assert_eq!(response.status, UpdateStatus::InProgress);
    }

    #[test]
    fn test_status_response_wire_shape() {
        let response = StatusResponse {
            status: UpdateStatus::NotRunning,
            update_error: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "NOT_RUNNING", "updateError": null})
        );
    }
}
