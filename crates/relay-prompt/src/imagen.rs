//! Single-string prompt for image generation models

use std::collections::BTreeSet;

use relay_protocol::{ChatMessage, ValidationError};
use relay_truncation::{check_selection, PromptError, TruncatablePrompt};
use serde::{Deserialize, Serialize};

use crate::messages::{ensure_last_is_user, plain_text};
use crate::PromptText;

/// Image models only see the last user message; earlier history is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagenPrompt {
    pub prompt: String,
}

impl ImagenPrompt {
    pub fn from_messages(messages: &[ChatMessage]) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::EmptyMessages);
        }
        ensure_last_is_user(messages)?;

        let index = messages.len() - 1;
        let prompt = plain_text(index, &messages[index])?;
        Ok(Self { prompt })
    }
}

impl TruncatablePrompt for ImagenPrompt {
    fn len(&self) -> usize {
        1
    }

    fn is_required(&self, _index: usize) -> bool {
        true
    }

    fn partition(&self) -> Vec<usize> {
        vec![1]
    }

    fn select(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError> {
        check_selection(1, indices)?;
        Ok(self.clone())
    }
}

impl PromptText for ImagenPrompt {
    fn text_segments(&self) -> Vec<&str> {
        vec![self.prompt.as_str()]
    }
}
