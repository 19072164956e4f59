//! Test prompts and tokenizers shared by the unit tests

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PromptError, TokenizerError};
use crate::estimate::LinearHistory;
use crate::partition::{trivial_partition, turn_partition};
use crate::prompt::{check_selection, TruncatablePrompt};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPrompt {
    pub system: Option<String>,
    pub messages: Vec<String>,
    pub paired: bool,
}

impl SlotPrompt {
    pub fn turns(system: Option<&str>, messages: &[&str]) -> Self {
        Self {
            system: system.map(str::to_string),
            messages: messages.iter().map(|m| m.to_string()).collect(),
            paired: true,
        }
    }

    pub fn flat(system: Option<&str>, messages: &[&str]) -> Self {
        Self {
            paired: false,
            ..Self::turns(system, messages)
        }
    }

    fn offset(&self) -> usize {
        usize::from(self.system.is_some())
    }

    pub fn texts(&self) -> Vec<&str> {
        self.system
            .iter()
            .chain(self.messages.iter())
            .map(String::as_str)
            .collect()
    }
}

impl TruncatablePrompt for SlotPrompt {
    fn len(&self) -> usize {
        self.offset() + self.messages.len()
    }

    fn is_required(&self, index: usize) -> bool {
        (index == 0 && self.system.is_some()) || index + 1 == self.len()
    }

    fn partition(&self) -> Vec<usize> {
        if self.paired {
            turn_partition(self.system.is_some(), self.messages.len())
        } else {
            trivial_partition(self.len())
        }
    }

    fn select(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError> {
        check_selection(self.len(), indices)?;
        let offset = self.offset();
        Ok(Self {
            system: self.system.clone().filter(|_| indices.contains(&0)),
            messages: self
                .messages
                .iter()
                .enumerate()
                .filter(|(index, _)| indices.contains(&(index + offset)))
                .map(|(_, message)| message.clone())
                .collect(),
            paired: self.paired,
        })
    }
}

impl LinearHistory for SlotPrompt {
    fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn context_chars(&self) -> usize {
        self.system.as_deref().map_or(0, |s| s.chars().count())
    }

    fn message_chars(&self, index: usize) -> usize {
        self.messages[index].chars().count()
    }

    fn skip_messages(&self, count: usize) -> Self {
        Self {
            messages: self.messages[count..].to_vec(),
            ..self.clone()
        }
    }
}

/// Counts whitespace-separated words and records every prompt it sees.
#[derive(Debug, Default)]
pub struct WordTokenizer {
    calls: Mutex<Vec<String>>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("tokenizer calls poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("tokenizer calls poisoned").len()
    }
}

#[async_trait]
impl Tokenizer<SlotPrompt> for WordTokenizer {
    async fn count_tokens(&self, prompt: &SlotPrompt) -> Result<usize, TokenizerError> {
        let text = prompt.texts().join(" ");
        let count = text.split_whitespace().count();
        self.calls
            .lock()
            .expect("tokenizer calls poisoned")
            .push(text);
        Ok(count)
    }
}

/// Always fails, for error propagation tests.
#[derive(Debug, Default)]
pub struct BrokenTokenizer;

#[async_trait]
impl Tokenizer<SlotPrompt> for BrokenTokenizer {
    async fn count_tokens(&self, _prompt: &SlotPrompt) -> Result<usize, TokenizerError> {
        Err(TokenizerError::Unavailable("quota exhausted".to_string()))
    }
}
