use thiserror::Error;

use crate::core::services::ServiceError;
use crate::storage::StorageError;

/// Error type that captures common cashbook failures.
#[derive(Debug, Error)]
pub enum CashbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ServiceError> for CashbookError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => CashbookError::Validation(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, CashbookError>;
