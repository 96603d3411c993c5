// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid result timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Malformed update result: {0}")]
    MalformedResult(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DomainError>;
