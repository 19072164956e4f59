//! Error types for prompt truncation

use thiserror::Error;

/// Infeasible budget outcomes. Each variant is a terminal, user-facing condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TruncatePromptError {
    #[error(
        "The requested maximum prompt tokens is {user_limit}. \
         However, the model's maximum context length is {model_limit} tokens."
    )]
    InconsistentLimits { user_limit: usize, model_limit: usize },

    #[error(
        "This model's maximum context length is {model_limit} tokens. \
         However, your messages resulted in {token_count} tokens. \
         Please reduce the length of the messages."
    )]
    ModelLimitOverflow { model_limit: usize, token_count: usize },

    #[error(
        "The requested maximum prompt tokens is {user_limit}. \
         However, the system messages and the last user message resulted in {token_count} tokens. \
         Please reduce the length of the messages or increase the maximum prompt tokens."
    )]
    UserLimitOverflow { user_limit: usize, token_count: usize },
}

/// Failures of the prompt slot contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("prompt has no messages")]
    Empty,

    #[error("slot {index} is out of range for a prompt of {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("the last message of the prompt can't be discarded")]
    MissingLastSlot,
}

/// Tokenizer oracle failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),

    #[error("tokenizer failed: {0}")]
    Failed(String),
}

/// Truncation error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TruncationError {
    #[error(transparent)]
    Truncate(#[from] TruncatePromptError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("internal truncation fault: {0}")]
    Internal(String),
}

/// Result type for truncation operations
pub type TruncationResult<T> = Result<T, TruncationError>;
