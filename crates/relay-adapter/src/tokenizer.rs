//! Offline tokenizers
//!
//! Provider token counting lives behind the same `Tokenizer` trait; these
//! local approximations are for tooling and tests.

use std::str::FromStr;

use async_trait::async_trait;
use relay_prompt::{ChatPrompt, GeminiPrompt, ImagenPrompt, PromptText};
use relay_truncation::{Tokenizer, TokenizerError};

/// A tokenizer usable with every prompt shape the adapter builds.
pub trait PromptTokenizer:
    Tokenizer<ChatPrompt> + Tokenizer<GeminiPrompt> + Tokenizer<ImagenPrompt>
{
}

impl<T> PromptTokenizer for T where
    T: Tokenizer<ChatPrompt> + Tokenizer<GeminiPrompt> + Tokenizer<ImagenPrompt> + ?Sized
{
}

/// One token per whitespace-separated word
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountTokenizer;

#[async_trait]
impl<P: PromptText + Sync> Tokenizer<P> for WordCountTokenizer {
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        Ok(prompt
            .text_segments()
            .iter()
            .map(|segment| segment.split_whitespace().count())
            .sum())
    }
}

/// Approximates tokens from character counts, with a flat cost per image.
#[derive(Debug, Clone, Copy)]
pub struct CharEstimateTokenizer {
    pub chars_per_token: usize,
    pub tokens_per_image: usize,
}

impl Default for CharEstimateTokenizer {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            tokens_per_image: 258,
        }
    }
}

impl CharEstimateTokenizer {
    fn segment_tokens(&self, segment: &str) -> usize {
        let chars = segment.chars().count();
        if chars == 0 {
            return 0;
        }
        chars.div_ceil(self.chars_per_token.max(1))
    }
}

#[async_trait]
impl<P: PromptText + Sync> Tokenizer<P> for CharEstimateTokenizer {
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        let text: usize = prompt
            .text_segments()
            .iter()
            .map(|segment| self.segment_tokens(segment))
            .sum();
        Ok(text + prompt.image_count() * self.tokens_per_image)
    }
}

/// Named offline tokenizer, as chosen on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenizerKind {
    Words,
    #[default]
    Chars,
}

impl TokenizerKind {
    pub fn build(self) -> Box<dyn PromptTokenizer> {
        match self {
            TokenizerKind::Words => Box::new(WordCountTokenizer),
            TokenizerKind::Chars => Box::new(CharEstimateTokenizer::default()),
        }
    }
}

impl FromStr for TokenizerKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "words" | "word" => Ok(TokenizerKind::Words),
            "chars" | "char" | "estimate" => Ok(TokenizerKind::Chars),
            _ => Err(format!(
                "unsupported tokenizer '{value}', expected one of: words, chars"
            )),
        }
    }
}
