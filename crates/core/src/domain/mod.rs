// Domain Layer - Update outcome model and its on-disk codec

pub mod codec;
pub mod error;
pub mod timestamp;
pub mod update;

// Re-exports
pub use error::DomainError;
pub use update::{StatusReport, UpdateResult, UpdateStatus};
