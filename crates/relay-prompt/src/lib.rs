//! Relay prompt shapes
//!
//! Each model family consumes conversations in its own shape:
//! - `ChatPrompt`: context string plus strictly alternating user/bot turns
//! - `GeminiPrompt`: optional system instruction plus a list of multi-part contents
//! - `ImagenPrompt`: a single text prompt
//!
//! All of them implement `TruncatablePrompt`. Slot indices line up one-to-one
//! with the request's wire messages for the chat shapes, so discarded slots can
//! be reported back as `discarded_messages` unchanged.

pub mod chat;
pub mod gemini;
pub mod imagen;
mod messages;

#[cfg(test)]
mod test_support;

pub use chat::{Author, ChatPrompt, ChatTurn};
pub use gemini::{Content, GeminiPrompt, GeminiRole, Part};
pub use imagen::ImagenPrompt;

/// Text view of a prompt, used by offline tokenizers.
pub trait PromptText {
    /// Every text segment in slot order.
    fn text_segments(&self) -> Vec<&str>;

    /// Number of inline images.
    fn image_count(&self) -> usize {
        0
    }
}
