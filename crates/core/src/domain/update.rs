// Update Domain Model

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Derived state of the self-update, never persisted directly
///
/// Wire names come from `as_str`, shared by serde and `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum UpdateStatus {
    NotRunning,
    InProgress,
    Done,
}

impl UpdateStatus {
    pub const ALL: [UpdateStatus; 3] = [
        UpdateStatus::NotRunning,
        UpdateStatus::InProgress,
        UpdateStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateStatus::NotRunning => "NOT_RUNNING",
            UpdateStatus::InProgress => "IN_PROGRESS",
            UpdateStatus::Done => "DONE",
        }
    }
}

impl From<UpdateStatus> for &'static str {
    fn from(status: UpdateStatus) -> Self {
        status.as_str()
    }
}

impl TryFrom<String> for UpdateStatus {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| format!("unknown update status: {raw}"))
    }
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recently completed update attempt
///
/// The on-disk format has second precision, so the timestamp is truncated
/// to whole seconds on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl UpdateResult {
    pub fn new(error: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            error,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    pub fn success(timestamp: DateTime<Utc>) -> Self {
        Self::new(None, timestamp)
    }

    pub fn failure(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Some(message.into()), timestamp)
    }

    /// Failure message, `None` when the update succeeded
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_error(self) -> Option<String> {
        self.error
    }
}

/// Answer of the status oracle: the derived state plus, for `Done`, the
/// stored failure message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: UpdateStatus,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn not_running() -> Self {
        Self {
            status: UpdateStatus::NotRunning,
            error: None,
        }
    }

    pub fn in_progress() -> Self {
        Self {
            status: UpdateStatus::InProgress,
            error: None,
        }
    }

    pub fn done(error: Option<String>) -> Self {
        Self {
            status: UpdateStatus::Done,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_display_matches_wire_names() {
        assert_eq!(UpdateStatus::NotRunning.to_string(), "NOT_RUNNING");
        assert_eq!(UpdateStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(UpdateStatus::Done.to_string(), "DONE");

        for status in UpdateStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(serde_json::from_str::<UpdateStatus>(&json).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_wire_name() {
        assert!(serde_json::from_str::<UpdateStatus>("\"RUNNING\"").is_err());
        assert!(serde_json::from_str::<UpdateStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_result_truncates_subseconds() {
        let ts = Utc.timestamp_millis_opt(1_612_947_455_789).unwrap();
        let result = UpdateResult::success(ts);
        assert_eq!(result.timestamp().timestamp_subsec_millis(), 0);
        assert_eq!(result.timestamp().timestamp(), 1_612_947_455);
    }

    #[test]
    fn test_failure_carries_message() {
        let result = UpdateResult::failure("disk full", Utc::now());
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("disk full"));
        assert_eq!(result.into_error().as_deref(), Some("disk full"));
    }
}
