//! Relay prompt truncation - fitting conversations into a token budget
//!
//! This crate provides:
//! - The `TruncatablePrompt` contract implemented by every model-specific prompt
//! - Block partitioning of prompt slots
//! - The greedy newest-to-oldest truncation search
//! - A character-length estimate for linear chat histories

pub mod error;
pub mod estimate;
pub mod partition;
pub mod prompt;
pub mod tokenizer;
pub mod truncate;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod proptests;

pub use error::{
    PromptError, TokenizerError, TruncatePromptError, TruncationError, TruncationResult,
};
pub use estimate::{estimate_discarded_count, truncate_history, LinearHistory};
pub use partition::{trivial_partition, turn_partition, BlockIndex};
pub use prompt::{check_selection, TruncatablePrompt};
pub use tokenizer::Tokenizer;
pub use truncate::{compute_discarded_messages, truncate_prompt, DiscardedMessages};

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{TruncatePromptError, TruncationError, TruncationResult};
    pub use crate::prompt::TruncatablePrompt;
    pub use crate::tokenizer::Tokenizer;
    pub use crate::truncate::{truncate_prompt, DiscardedMessages};
}
