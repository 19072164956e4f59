//! Relay adapter - fitting chat-completion requests to provider models
//!
//! This crate provides:
//! - The model registry and its configuration
//! - Token limit resolution per request
//! - Offline tokenizers
//! - `ChatTruncator`, which turns a request into a budget-satisfying prompt

pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod tokenizer;
pub mod truncator;

pub use config::{ConfigError, ModelFamily, ModelSpec, ModelsConfig, TruncationStrategy};
pub use error::{AdapterError, AdapterResult};
pub use registry::{Limits, ModelRegistry, MODELS_CONFIG_ENV};
pub use tokenizer::{CharEstimateTokenizer, PromptTokenizer, TokenizerKind, WordCountTokenizer};
pub use truncator::{ChatTruncator, ModelPrompt, TruncatedChat};

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{AdapterError, AdapterResult};
    pub use crate::registry::ModelRegistry;
    pub use crate::tokenizer::PromptTokenizer;
    pub use crate::truncator::{ChatTruncator, TruncatedChat};
}
