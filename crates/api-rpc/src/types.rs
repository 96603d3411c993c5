//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method results. Neither method takes parameters.

use kvmd_core::domain::{StatusReport, UpdateStatus};
use serde::Serialize;

/// update.start.v1 - Launch an update
#[derive(Debug, Clone, Serialize)]
pub struct StartUpdateResponse {
    pub started: bool,
}

/// update.status.v1 - Current update status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: UpdateStatus,
    pub update_error: Option<String>,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        Self {
            status: report.status,
            update_error: report.error,
        }
    }
}
