//! Greedy block-elimination truncation
//!
//! Required slots (and their block mates) are always kept. Remaining blocks are
//! re-admitted newest first until the next one would overflow the user limit;
//! every older block is then discarded. The scan never backtracks.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::{TruncatePromptError, TruncationError, TruncationResult};
use crate::partition::BlockIndex;
use crate::prompt::TruncatablePrompt;
use crate::tokenizer::Tokenizer;

/// Strictly increasing slot indices removed from the original prompt.
pub type DiscardedMessages = Vec<usize>;

/// The budget a truncation call has to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Budget {
    Unlimited,
    ModelLimit(usize),
    UserLimit(usize),
}

impl Budget {
    pub(crate) fn resolve(
        model_limit: Option<usize>,
        user_limit: Option<usize>,
    ) -> Result<Self, TruncatePromptError> {
        match (model_limit, user_limit) {
            (Some(model_limit), Some(user_limit)) if user_limit > model_limit => {
                Err(TruncatePromptError::InconsistentLimits {
                    user_limit,
                    model_limit,
                })
            }
            (_, Some(user_limit)) => Ok(Self::UserLimit(user_limit)),
            (Some(model_limit), None) => Ok(Self::ModelLimit(model_limit)),
            (None, None) => Ok(Self::Unlimited),
        }
    }
}

/// Without a user limit nothing can be discarded; the full prompt is only
/// checked against the model's own context window.
pub(crate) async fn check_model_limit<P, T>(
    prompt: &P,
    tokenizer: &T,
    model_limit: usize,
) -> TruncationResult<Result<DiscardedMessages, TruncatePromptError>>
where
    P: Sync,
    T: Tokenizer<P> + ?Sized,
{
    let token_count = tokenizer.count_tokens(prompt).await?;
    if token_count <= model_limit {
        return Ok(Ok(Vec::new()));
    }

    debug!(model_limit, token_count, "Prompt exceeds the model context window");
    Ok(Err(TruncatePromptError::ModelLimitOverflow {
        model_limit,
        token_count,
    }))
}

/// Computes which slots to drop so the prompt fits the budget.
///
/// The outer `Result` carries faults (tokenizer, broken prompt contract); the
/// inner one carries infeasible budgets as values.
pub async fn compute_discarded_messages<P, T>(
    prompt: &P,
    tokenizer: &T,
    model_limit: Option<usize>,
    user_limit: Option<usize>,
) -> TruncationResult<Result<DiscardedMessages, TruncatePromptError>>
where
    P: TruncatablePrompt + Sync,
    T: Tokenizer<P> + ?Sized,
{
    match Budget::resolve(model_limit, user_limit) {
        Err(err) => Ok(Err(err)),
        Ok(Budget::Unlimited) => Ok(Ok(Vec::new())),
        Ok(Budget::ModelLimit(model_limit)) => {
            check_model_limit(prompt, tokenizer, model_limit).await
        }
        Ok(Budget::UserLimit(user_limit)) => discard_to_fit(prompt, tokenizer, user_limit).await,
    }
}

async fn discard_to_fit<P, T>(
    prompt: &P,
    tokenizer: &T,
    user_limit: usize,
) -> TruncationResult<Result<DiscardedMessages, TruncatePromptError>>
where
    P: TruncatablePrompt + Sync,
    T: Tokenizer<P> + ?Sized,
{
    let len = prompt.len();
    let partition = prompt.partition();
    let covered: usize = partition.iter().sum();
    if covered != len {
        return Err(TruncationError::Internal(format!(
            "partition covers {covered} slots but the prompt has {len}"
        )));
    }

    let blocks = BlockIndex::new(&partition);
    let block_of = |index: usize| {
        blocks.block_of(index).ok_or_else(|| {
            TruncationError::Internal(format!("slot {index} has no partition block"))
        })
    };

    let mut kept = BTreeSet::new();
    for index in (0..len).filter(|&index| prompt.is_required(index)) {
        kept.extend(block_of(index)?.iter().copied());
    }

    let token_count = tokenizer.count_tokens(&prompt.select(&kept)?).await?;
    trace!(user_limit, token_count, kept = ?kept, "Required slots probed");
    if token_count > user_limit {
        debug!(user_limit, token_count, "Required slots alone exceed the user limit");
        return Ok(Err(TruncatePromptError::UserLimitOverflow {
            user_limit,
            token_count,
        }));
    }

    for index in (0..len).rev() {
        if kept.contains(&index) {
            continue;
        }

        let mut candidate = kept.clone();
        candidate.extend(block_of(index)?.iter().copied());

        let token_count = tokenizer.count_tokens(&prompt.select(&candidate)?).await?;
        trace!(user_limit, token_count, slot = index, "Block probed");
        if token_count > user_limit {
            break;
        }
        kept = candidate;
    }

    let discarded: DiscardedMessages = (0..len).filter(|index| !kept.contains(index)).collect();
    debug!(user_limit, discarded = ?discarded, "Prompt truncated");
    Ok(Ok(discarded))
}

/// Truncates `prompt` to the budget, returning the discarded slot indices and
/// the narrowed prompt.
pub async fn truncate_prompt<P, T>(
    prompt: &P,
    tokenizer: &T,
    model_limit: Option<usize>,
    user_limit: Option<usize>,
) -> TruncationResult<(DiscardedMessages, P)>
where
    P: TruncatablePrompt + Sync,
    T: Tokenizer<P> + ?Sized,
{
    let discarded = compute_discarded_messages(prompt, tokenizer, model_limit, user_limit).await??;
    let truncated = prompt.omit(&discarded.iter().copied().collect())?;
    Ok((discarded, truncated))
}
