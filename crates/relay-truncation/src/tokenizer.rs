//! Tokenizer oracle abstraction

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TokenizerError;

/// Counts the tokens a candidate prompt would consume.
///
/// Calls may be slow (remote counting endpoints) and are awaited one at a
/// time by the truncation search. Identical prompts should yield identical
/// counts.
#[async_trait]
pub trait Tokenizer<P: Sync + ?Sized>: Send + Sync {
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError>;
}

#[async_trait]
impl<P, T> Tokenizer<P> for Arc<T>
where
    P: Sync + ?Sized,
    T: Tokenizer<P> + ?Sized,
{
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        (**self).count_tokens(prompt).await
    }
}

#[async_trait]
impl<P, T> Tokenizer<P> for &T
where
    P: Sync + ?Sized,
    T: Tokenizer<P> + ?Sized,
{
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        (**self).count_tokens(prompt).await
    }
}
