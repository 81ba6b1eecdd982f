//! Error types for the KV user source

use onboard_core::ServiceError;
use thiserror::Error;

/// Errors that can occur while reading users from the store
#[derive(Error, Debug)]
pub enum KvError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("No connection URL configured")]
    MissingUrl,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timed out after {secs}s while {operation}")]
    Timeout { operation: String, secs: u64 },
}

impl From<KvError> for ServiceError {
    fn from(error: KvError) -> Self {
        match error {
            KvError::InvalidUrl(_) | KvError::MissingUrl => {
                ServiceError::configuration(error.to_string())
            }
            other => ServiceError::external("redis", other.to_string()),
        }
    }
}
