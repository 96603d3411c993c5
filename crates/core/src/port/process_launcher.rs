// Process Launcher Port
// Fire-and-forget hand-off of the privileged update to the OS

use async_trait::async_trait;
use thiserror::Error;

/// Launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Invalid launch command: {0}")]
    InvalidCommand(String),
}

/// Detached launcher for the update process
///
/// Implementations:
/// - ServiceLauncher: asks the system service manager to start the updater
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Start the update without waiting for it
    ///
    /// Success means the OS accepted the spawn. The launcher keeps no
    /// handle, and the spawned process must outlive the server.
    ///
    /// # Errors
    /// - LaunchError::SpawnFailed if the command cannot be started
    async fn spawn_detached(&self) -> Result<(), LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::liveness_probe::mocks::{MockLivenessProbe, ProbeBehavior};
    use std::sync::{Arc, Mutex};

    /// Mock ProcessLauncher that records spawn calls
    pub struct MockProcessLauncher {
        fail_with: Option<String>,
        spawn_count: Arc<Mutex<usize>>,
        // Flipped to Running on spawn, like a real process table would be
        probe: Option<Arc<MockLivenessProbe>>,
    }

    impl MockProcessLauncher {
        pub fn new() -> Self {
            Self {
                fail_with: None,
                spawn_count: Arc::new(Mutex::new(0)),
                probe: None,
            }
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                fail_with: Some(message.into()),
                ..Self::new()
            }
        }

        /// Mark `probe` as running whenever a spawn succeeds
        pub fn marks_running(mut self, probe: Arc<MockLivenessProbe>) -> Self {
            self.probe = Some(probe);
            self
        }

        pub fn spawn_count(&self) -> usize {
            *self.spawn_count.lock().unwrap()
        }
    }

    impl Default for MockProcessLauncher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn spawn_detached(&self) -> Result<(), LaunchError> {
            *self.spawn_count.lock().unwrap() += 1;

            if let Some(msg) = &self.fail_with {
                return Err(LaunchError::SpawnFailed(msg.clone()));
            }
            if let Some(probe) = &self.probe {
                probe.set_behavior(ProbeBehavior::Running);
            }
            Ok(())
        }
    }
}
