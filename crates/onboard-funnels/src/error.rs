//! Error types for funnel aggregation

use thiserror::Error;

/// Errors that can occur while building a funnel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunnelError {
    /// The stage order is empty or lists a stage twice
    #[error("Invalid stage order: {message}")]
    InvalidStageOrder { message: String },

    #[error("Unknown counting policy: {0}")]
    UnknownPolicy(String),
}

impl From<FunnelError> for onboard_core::ServiceError {
    fn from(error: FunnelError) -> Self {
        onboard_core::ServiceError::validation(error.to_string())
    }
}
