//! Discard-count estimate for linear chat histories
//!
//! Histories made of alternating turns behind an optional context string are
//! first trimmed on raw character length, scaled by the prompt's overall
//! characters-per-token ratio. The estimate is then corrected a pair at a time
//! with exact tokenizer calls, so only a handful of them are needed.

use tracing::{debug, trace};

use crate::error::{TruncatePromptError, TruncationResult};
use crate::prompt::TruncatablePrompt;
use crate::tokenizer::Tokenizer;
use crate::truncate::{check_model_limit, Budget, DiscardedMessages};

/// A context string followed by a flat list of alternating turns.
pub trait LinearHistory: Sized {
    /// Number of turns, not counting the context.
    fn message_count(&self) -> usize;

    fn context_chars(&self) -> usize;

    fn message_chars(&self, index: usize) -> usize;

    /// A copy without the first `count` turns.
    fn skip_messages(&self, count: usize) -> Self;
}

/// Estimates how many leading turns must go for the history to fit `limit`.
///
/// Turns are dropped in pairs and the last turn is never dropped.
pub async fn estimate_discarded_count<P, T>(
    prompt: &P,
    tokenizer: &T,
    limit: usize,
) -> TruncationResult<Result<usize, TruncatePromptError>>
where
    P: LinearHistory + Sync,
    T: Tokenizer<P> + ?Sized,
{
    let prompt_tokens = tokenizer.count_tokens(prompt).await?;
    if prompt_tokens <= limit || prompt_tokens == 0 {
        return Ok(Ok(0));
    }

    let count = prompt.message_count();
    if count <= 1 {
        return Ok(Err(TruncatePromptError::UserLimitOverflow {
            user_limit: limit,
            token_count: prompt_tokens,
        }));
    }
    let max_discard = (count - 1) / 2 * 2;

    let total_chars =
        prompt.context_chars() + (0..count).map(|i| prompt.message_chars(i)).sum::<usize>();
    let mut discard = 0;
    if total_chars > 0 {
        let chars_per_token = total_chars as f64 / prompt_tokens as f64;
        let mut remaining = total_chars;
        while discard < max_discard && remaining as f64 / chars_per_token > limit as f64 {
            remaining = remaining.saturating_sub(
                prompt.message_chars(discard) + prompt.message_chars(discard + 1),
            );
            discard += 2;
        }
    }
    trace!(limit, prompt_tokens, estimate = discard, "Discard count estimated");

    let mut tokens = if discard == 0 {
        prompt_tokens
    } else {
        tokenizer.count_tokens(&prompt.skip_messages(discard)).await?
    };

    if tokens > limit {
        while tokens > limit {
            if discard >= max_discard {
                debug!(limit, tokens, "Context and last message alone exceed the limit");
                return Ok(Err(TruncatePromptError::UserLimitOverflow {
                    user_limit: limit,
                    token_count: tokens,
                }));
            }
            discard += 2;
            tokens = tokenizer.count_tokens(&prompt.skip_messages(discard)).await?;
        }
    } else if tokens < limit {
        // Nothing discarded is known to overflow, so stop before reaching it.
        while discard > 2 {
            let candidate = discard - 2;
            let candidate_tokens = tokenizer
                .count_tokens(&prompt.skip_messages(candidate))
                .await?;
            if candidate_tokens > limit {
                break;
            }
            discard = candidate;
        }
    }

    Ok(Ok(discard))
}

/// Truncates a linear history using the discard-count estimate.
///
/// Limits are interpreted exactly as by [`crate::truncate_prompt`]; discarded
/// indices are slot indices, so they skip over the context slot.
pub async fn truncate_history<P, T>(
    prompt: &P,
    tokenizer: &T,
    model_limit: Option<usize>,
    user_limit: Option<usize>,
) -> TruncationResult<(DiscardedMessages, P)>
where
    P: LinearHistory + TruncatablePrompt + Sync,
    T: Tokenizer<P> + ?Sized,
{
    let discarded = match Budget::resolve(model_limit, user_limit)? {
        Budget::Unlimited => Vec::new(),
        Budget::ModelLimit(model_limit) => {
            check_model_limit(prompt, tokenizer, model_limit).await??
        }
        Budget::UserLimit(user_limit) => {
            let count = estimate_discarded_count(prompt, tokenizer, user_limit).await??;
            let offset = prompt.len() - prompt.message_count();
            (offset..offset + count).collect()
        }
    };

    let truncated = prompt.omit(&discarded.iter().copied().collect())?;
    Ok((discarded, truncated))
}
