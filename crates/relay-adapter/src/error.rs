//! Error types for the adapter

use relay_protocol::{ErrorResponse, ValidationError};
use relay_truncation::{TruncatePromptError, TruncationError};
use thiserror::Error;

use crate::config::ConfigError;

/// Adapter error type
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("model '{0}' is not configured")]
    UnknownModel(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Truncation(#[from] TruncationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AdapterError {
    /// Wire-level error envelope for this failure.
    pub fn to_response(&self) -> ErrorResponse {
        let message = self.to_string();
        match self {
            AdapterError::UnknownModel(_) => ErrorResponse::not_found(message),
            AdapterError::Validation(err) => ErrorResponse::from(err),
            AdapterError::Truncation(TruncationError::Truncate(err)) => match err {
                TruncatePromptError::InconsistentLimits { .. } => {
                    ErrorResponse::invalid_request(message)
                }
                TruncatePromptError::ModelLimitOverflow { .. } => {
                    ErrorResponse::context_length_exceeded(message)
                }
                TruncatePromptError::UserLimitOverflow { .. } => {
                    ErrorResponse::truncate_prompt(message)
                }
            },
            AdapterError::Truncation(TruncationError::Tokenizer(_)) => {
                ErrorResponse::upstream(message)
            }
            AdapterError::Truncation(TruncationError::Prompt(_) | TruncationError::Internal(_))
            | AdapterError::Config(_) => ErrorResponse::internal(message),
        }
    }
}

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
