// Port Layer - Interfaces for external dependencies

pub mod launch_lock;
pub mod liveness_probe;
pub mod process_launcher;
pub mod result_store;
pub mod time_provider;

// Re-exports
pub use launch_lock::{LaunchGuard, LaunchLock};
pub use liveness_probe::{LivenessError, LivenessProbe};
pub use process_launcher::{LaunchError, ProcessLauncher};
pub use result_store::ResultStore;
pub use time_provider::TimeProvider;
