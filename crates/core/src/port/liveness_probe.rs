// Process Liveness Port
// reason: async-trait needed (Hexagonal Architecture)
use async_trait::async_trait;
use thiserror::Error;

/// Liveness probe errors
#[derive(Error, Debug)]
pub enum LivenessError {
    /// The process table could not be read at all
    #[error("Process table unavailable: {0}")]
    ProcessTableUnavailable(String),
}

/// Heuristic "is the update script executing" check
///
/// There is no parent/child relationship to rely on: the request that
/// launched the update and the request asking about it may be served by
/// unrelated server processes. The live OS process table is the only
/// signal that survives a server restart.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// true if any process's command line contains the update script path
    ///
    /// # Errors
    /// - LivenessError::ProcessTableUnavailable when the scan cannot be
    ///   performed. Callers must not read this as "not running".
    async fn is_update_running(&self) -> Result<bool, LivenessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock probe behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ProbeBehavior {
        Running,
        NotRunning,
        Unavailable,
    }

    /// Mock LivenessProbe for testing
    pub struct MockLivenessProbe {
        behavior: Arc<Mutex<ProbeBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockLivenessProbe {
        pub fn new(behavior: ProbeBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn running() -> Self {
            Self::new(ProbeBehavior::Running)
        }

        pub fn not_running() -> Self {
            Self::new(ProbeBehavior::NotRunning)
        }

        pub fn unavailable() -> Self {
            Self::new(ProbeBehavior::Unavailable)
        }

        pub fn set_behavior(&self, behavior: ProbeBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl LivenessProbe for MockLivenessProbe {
        async fn is_update_running(&self) -> Result<bool, LivenessError> {
            *self.call_count.lock().unwrap() += 1;

            match *self.behavior.lock().unwrap() {
                ProbeBehavior::Running => Ok(true),
                ProbeBehavior::NotRunning => Ok(false),
                ProbeBehavior::Unavailable => Err(LivenessError::ProcessTableUnavailable(
                    "mock process table".to_string(),
                )),
            }
        }
    }
}
