//! Content-list prompt for multimodal chat models

use std::collections::BTreeSet;

use relay_protocol::{ChatMessage, ContentPart, MessageContent, Role, ValidationError};
use relay_truncation::{check_selection, PromptError, TruncatablePrompt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::messages::{ensure_last_is_user, plain_text, required_content, split_system};
use crate::PromptText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeminiRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    ImageUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: GeminiRole,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
}

impl GeminiPrompt {
    pub fn from_messages(
        messages: &[ChatMessage],
        strict_alternation: bool,
    ) -> Result<Self, ValidationError> {
        let (system, rest, offset) = split_system(messages)?;
        let system_instruction = system.map(|message| plain_text(0, message)).transpose()?;

        let mut contents = Vec::with_capacity(rest.len());
        for (position, message) in rest.iter().enumerate() {
            let index = position + offset;
            let role = match message.role {
                Role::User => GeminiRole::User,
                Role::Assistant => GeminiRole::Model,
                other => {
                    return Err(ValidationError::InvalidMessage {
                        index,
                        reason: format!("role '{other}' is not supported by this model"),
                    })
                }
            };
            if strict_alternation {
                let expected = if position % 2 == 0 {
                    GeminiRole::User
                } else {
                    GeminiRole::Model
                };
                if role != expected {
                    return Err(ValidationError::InvalidMessage {
                        index,
                        reason: "turns must alternate between the user and the assistant"
                            .to_string(),
                    });
                }
            }
            contents.push(Content {
                role,
                parts: parts(required_content(index, message)?),
            });
        }
        ensure_last_is_user(rest)?;

        debug!(
            has_system_instruction = system_instruction.is_some(),
            contents = contents.len(),
            strict_alternation,
            "Gemini prompt parsed"
        );
        Ok(Self {
            system_instruction,
            contents,
        })
    }

    fn offset(&self) -> usize {
        usize::from(self.system_instruction.is_some())
    }
}

fn parts(content: &MessageContent) -> Vec<Part> {
    match content {
        MessageContent::Text(text) => vec![Part::Text(text.clone())],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => Part::Text(text.clone()),
                ContentPart::ImageUrl { image_url } => Part::ImageUrl(image_url.url.clone()),
            })
            .collect(),
    }
}

/// Blocks open at a user content and run through the model replies after it,
/// so a truncated prompt always resumes on a user turn. Model contents ahead
/// of the first user content form a block of their own.
fn user_led_partition(has_system: bool, contents: &[Content]) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(contents.len() + 1);
    if has_system {
        sizes.push(1);
    }

    let mut block = 0;
    for content in contents {
        if content.role == GeminiRole::User && block > 0 {
            sizes.push(block);
            block = 0;
        }
        block += 1;
    }
    if block > 0 {
        sizes.push(block);
    }
    sizes
}

impl TruncatablePrompt for GeminiPrompt {
    fn len(&self) -> usize {
        self.offset() + self.contents.len()
    }

    fn is_required(&self, index: usize) -> bool {
        (index == 0 && self.system_instruction.is_some()) || index + 1 == self.len()
    }

    fn partition(&self) -> Vec<usize> {
        user_led_partition(self.system_instruction.is_some(), &self.contents)
    }

    fn select(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError> {
        check_selection(self.len(), indices)?;
        let offset = self.offset();

        Ok(Self {
            system_instruction: self
                .system_instruction
                .clone()
                .filter(|_| indices.contains(&0)),
            contents: self
                .contents
                .iter()
                .enumerate()
                .filter(|(position, _)| indices.contains(&(position + offset)))
                .map(|(_, content)| content.clone())
                .collect(),
        })
    }
}

impl PromptText for GeminiPrompt {
    fn text_segments(&self) -> Vec<&str> {
        let parts = self.contents.iter().flat_map(|content| &content.parts);
        self.system_instruction
            .iter()
            .map(String::as_str)
            .chain(parts.filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::ImageUrl(_) => None,
            }))
            .collect()
    }

    fn image_count(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|content| &content.parts)
            .filter(|part| matches!(part, Part::ImageUrl(_)))
            .count()
    }
}
