// Central Error Type for the Update Subsystem

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Recoverable, user-facing: a second start while an update runs
    #[error("An update is already in progress")]
    AlreadyInProgress,

    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Liveness error: {0}")]
    Liveness(#[from] crate::port::LivenessError),

    #[error("Launch error: {0}")]
    Launch(#[from] crate::port::LaunchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Attach the offending path to an IO error
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
