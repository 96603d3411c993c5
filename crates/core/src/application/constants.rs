// Update orchestration constants (No magic values)
use std::time::Duration;

/// Interval between liveness checks while waiting for a freshly spawned
/// updater to appear in the process table (100ms)
pub const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on that wait (5s). The service manager usually forks the
/// script well within this.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
