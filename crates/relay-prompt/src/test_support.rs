use async_trait::async_trait;
use relay_truncation::{TokenizerError, Tokenizer};

use crate::PromptText;

/// One token per whitespace-separated word.
pub struct WordCounter;

#[async_trait]
impl<P: PromptText + Sync> Tokenizer<P> for WordCounter {
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        Ok(prompt
            .text_segments()
            .iter()
            .map(|segment| segment.split_whitespace().count())
            .sum())
    }
}
