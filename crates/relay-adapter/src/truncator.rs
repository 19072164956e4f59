//! Request-level truncation
//!
//! `ChatTruncator` ties the pieces together for one chat-completion request:
//! validate it, look up the model, build the family's prompt shape, resolve
//! the limits, and run the truncation search.

use std::sync::Arc;

use relay_prompt::{ChatPrompt, GeminiPrompt, ImagenPrompt};
use relay_protocol::{ChatCompletionRequest, Statistics};
use relay_truncation::{truncate_history, truncate_prompt, DiscardedMessages};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ModelFamily, TruncationStrategy};
use crate::error::AdapterResult;
use crate::registry::ModelRegistry;
use crate::tokenizer::PromptTokenizer;

/// A prompt in the shape its model family consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ModelPrompt {
    Chat(ChatPrompt),
    Gemini(GeminiPrompt),
    Imagen(ImagenPrompt),
}

/// Outcome of truncating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedChat {
    pub model: String,
    pub prompt: ModelPrompt,
    /// Indices into the request's `messages`, strictly increasing
    pub discarded_messages: DiscardedMessages,
    /// Whether the caller asked for `max_prompt_tokens`
    pub user_limit_applied: bool,
}

impl TruncatedChat {
    /// Response statistics. `discarded_messages` is only reported when the
    /// caller set `max_prompt_tokens`.
    pub fn statistics(&self) -> Statistics {
        if self.user_limit_applied {
            Statistics::with_discarded_messages(self.discarded_messages.clone())
        } else {
            Statistics::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatTruncator {
    registry: Arc<ModelRegistry>,
}

impl ChatTruncator {
    pub fn new(registry: impl Into<Arc<ModelRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub async fn truncate_request<T>(
        &self,
        model_id: &str,
        request: &ChatCompletionRequest,
        tokenizer: &T,
    ) -> AdapterResult<TruncatedChat>
    where
        T: PromptTokenizer + ?Sized,
    {
        request.validate()?;
        let spec = self.registry.get(model_id)?;
        let limits = self.registry.count_limits(model_id, request)?;

        debug!(
            model = model_id,
            family = spec.family.as_str(),
            messages = request.messages.len(),
            model_limit = ?limits.model_limit,
            user_limit = ?limits.user_limit,
            "Truncating request"
        );

        let (discarded_messages, prompt) = match spec.family {
            ModelFamily::ChatBison | ModelFamily::CodechatBison => {
                let prompt = ChatPrompt::from_messages(&request.messages)?;
                let (discarded, prompt) = match spec.strategy {
                    TruncationStrategy::Incremental => {
                        truncate_prompt(&prompt, tokenizer, limits.model_limit, limits.user_limit)
                            .await?
                    }
                    TruncationStrategy::Estimated => {
                        truncate_history(&prompt, tokenizer, limits.model_limit, limits.user_limit)
                            .await?
                    }
                };
                (discarded, ModelPrompt::Chat(prompt))
            }
            ModelFamily::Gemini => {
                let prompt = GeminiPrompt::from_messages(&request.messages, spec.strict_alternation)?;
                let (discarded, prompt) =
                    truncate_prompt(&prompt, tokenizer, limits.model_limit, limits.user_limit)
                        .await?;
                (discarded, ModelPrompt::Gemini(prompt))
            }
            ModelFamily::Imagen => {
                let prompt = ImagenPrompt::from_messages(&request.messages)?;
                let (discarded, prompt) =
                    truncate_prompt(&prompt, tokenizer, limits.model_limit, limits.user_limit)
                        .await?;
                (discarded, ModelPrompt::Imagen(prompt))
            }
        };

        info!(
            model = model_id,
            discarded = discarded_messages.len(),
            user_limit = ?limits.user_limit,
            "Request truncated"
        );

        Ok(TruncatedChat {
            model: spec.id.clone(),
            prompt,
            discarded_messages,
            user_limit_applied: limits.user_limit.is_some(),
        })
    }
}
