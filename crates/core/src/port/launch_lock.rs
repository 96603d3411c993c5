// Launch Lock Port
// Single-instance guard around the check-clear-spawn sequence

use crate::error::Result;

/// Held while a start request is between its status check and the moment
/// the spawned updater is visible in the process table. Released on drop.
pub struct LaunchGuard {
    _inner: Box<dyn Send>,
}

impl LaunchGuard {
    pub fn new(inner: impl Send + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl std::fmt::Debug for LaunchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LaunchGuard")
    }
}

/// Exclusive, non-blocking launch lock
///
/// Must exclude callers in other processes as well as other threads of
/// this one, since start requests may be served by unrelated workers.
pub trait LaunchLock: Send + Sync {
    /// Take the lock, or `None` if someone else holds it
    fn try_acquire(&self) -> Result<Option<LaunchGuard>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-process lock backed by a flag
    #[derive(Default)]
    pub struct MockLaunchLock {
        held: Arc<AtomicBool>,
    }

    struct Release(Arc<AtomicBool>);

    impl Drop for Release {
        fn drop(&mut self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    impl MockLaunchLock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_held(&self) -> bool {
            self.held.load(Ordering::SeqCst)
        }
    }

    impl LaunchLock for MockLaunchLock {
        fn try_acquire(&self) -> Result<Option<LaunchGuard>> {
            if self
                .held
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Ok(None);
            }
            Ok(Some(LaunchGuard::new(Release(self.held.clone()))))
        }
    }
}
