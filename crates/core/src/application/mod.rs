// Application Layer - Update use cases

pub mod constants;
pub mod launcher;
pub mod status;

// Re-exports
pub use launcher::{SettleConfig, UpdateLauncher};
pub use status::StatusOracle;
