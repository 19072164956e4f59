//! Turn-based chat prompt
//!
//! A context string followed by turns that strictly alternate between the user
//! and the bot, starting and ending with the user. Turns are kept or dropped in
//! user/bot pairs so the alternation survives truncation.

use std::collections::BTreeSet;

use relay_protocol::{ChatMessage, Role, ValidationError};
use relay_truncation::{
    check_selection, turn_partition, LinearHistory, PromptError, TruncatablePrompt,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messages::{ensure_last_is_user, plain_text, split_system};
use crate::PromptText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub author: Author,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            author: Author::Bot,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub turns: Vec<ChatTurn>,
}

impl ChatPrompt {
    pub fn from_messages(messages: &[ChatMessage]) -> Result<Self, ValidationError> {
        let (system, rest, offset) = split_system(messages)?;
        let context = system.map(|message| plain_text(0, message)).transpose()?;

        let mut turns = Vec::with_capacity(rest.len());
        for (position, message) in rest.iter().enumerate() {
            let index = position + offset;
            let (expected, author) = if position % 2 == 0 {
                (Role::User, Author::User)
            } else {
                (Role::Assistant, Author::Bot)
            };
            if message.role != expected {
                return Err(ValidationError::InvalidMessage {
                    index,
                    reason: format!(
                        "expected a '{expected}' message, got '{}': turns must alternate \
                         between the user and the assistant",
                        message.role
                    ),
                });
            }
            turns.push(ChatTurn {
                author,
                content: plain_text(index, message)?,
            });
        }
        ensure_last_is_user(rest)?;

        debug!(
            has_context = context.is_some(),
            turns = turns.len(),
            "Chat prompt parsed"
        );
        Ok(Self { context, turns })
    }

    fn offset(&self) -> usize {
        usize::from(self.context.is_some())
    }
}

impl TruncatablePrompt for ChatPrompt {
    fn len(&self) -> usize {
        self.offset() + self.turns.len()
    }

    fn is_required(&self, index: usize) -> bool {
        (index == 0 && self.context.is_some()) || index + 1 == self.len()
    }

    fn partition(&self) -> Vec<usize> {
        turn_partition(self.context.is_some(), self.turns.len())
    }

    fn select(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError> {
        check_selection(self.len(), indices)?;
        let offset = self.offset();

        Ok(Self {
            context: self.context.clone().filter(|_| indices.contains(&0)),
            turns: self
                .turns
                .iter()
                .enumerate()
                .filter(|(position, _)| indices.contains(&(position + offset)))
                .map(|(_, turn)| turn.clone())
                .collect(),
        })
    }
}

impl LinearHistory for ChatPrompt {
    fn message_count(&self) -> usize {
        self.turns.len()
    }

    fn context_chars(&self) -> usize {
        self.context.as_deref().map_or(0, |context| context.chars().count())
    }

    fn message_chars(&self, index: usize) -> usize {
        self.turns[index].content.chars().count()
    }

    fn skip_messages(&self, count: usize) -> Self {
        Self {
            context: self.context.clone(),
            turns: self.turns[count..].to_vec(),
        }
    }
}

impl PromptText for ChatPrompt {
    fn text_segments(&self) -> Vec<&str> {
        self.context
            .iter()
            .map(String::as_str)
            .chain(self.turns.iter().map(|turn| turn.content.as_str()))
            .collect()
    }
}
