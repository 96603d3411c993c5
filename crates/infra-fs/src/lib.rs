// kvmd Infrastructure - Filesystem Adapters
// Implements: ResultStore, LaunchLock

pub mod atomic;
pub mod launch_lock;
pub mod legacy;
pub mod result_store;

pub use launch_lock::FlockLaunchLock;
pub use result_store::FsResultStore;
