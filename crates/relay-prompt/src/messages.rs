//! Shared checks over wire messages

use relay_protocol::{ChatMessage, MessageContent, Role, ValidationError};

/// Splits off a leading system message and rejects system messages anywhere else.
///
/// Returns the system message (if any), the remaining messages, and the wire
/// index of the first remaining message.
pub(crate) fn split_system(
    messages: &[ChatMessage],
) -> Result<(Option<&ChatMessage>, &[ChatMessage], usize), ValidationError> {
    let (system, rest, offset) = match messages.split_first() {
        None => return Err(ValidationError::EmptyMessages),
        Some((first, rest)) if first.role == Role::System => (Some(first), rest, 1),
        Some(_) => (None, messages, 0),
    };

    if let Some(position) = rest.iter().position(|m| m.role == Role::System) {
        return Err(ValidationError::InvalidMessage {
            index: position + offset,
            reason: "system messages are only allowed at the start of the conversation"
                .to_string(),
        });
    }
    if rest.is_empty() {
        return Err(ValidationError::Unsupported(
            "the conversation must contain at least one user message".to_string(),
        ));
    }

    Ok((system, rest, offset))
}

/// Plain text of a message that must not carry images.
pub(crate) fn plain_text(index: usize, message: &ChatMessage) -> Result<String, ValidationError> {
    let content = required_content(index, message)?;
    if content.has_images() {
        return Err(ValidationError::InvalidMessage {
            index,
            reason: "images are not supported by this model".to_string(),
        });
    }
    Ok(content.text())
}

pub(crate) fn required_content(
    index: usize,
    message: &ChatMessage,
) -> Result<&MessageContent, ValidationError> {
    message
        .content
        .as_ref()
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ValidationError::InvalidMessage {
            index,
            reason: "message content is required".to_string(),
        })
}

pub(crate) fn ensure_last_is_user(messages: &[ChatMessage]) -> Result<(), ValidationError> {
    match messages.last() {
        Some(message) if message.role == Role::User => Ok(()),
        _ => Err(ValidationError::Unsupported(
            "the last message must be from the user".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use relay_protocol::{ChatMessage, ValidationError};

    use super::*;

    #[test]
    fn split_system_detaches_leading_system() {
        let messages = vec![ChatMessage::system("rules"), ChatMessage::user("hi")];

        let (system, rest, offset) = split_system(&messages).unwrap();

        assert_eq!(system.map(ChatMessage::text).as_deref(), Some("rules"));
        assert_eq!(rest.len(), 1);
        assert_eq!(offset, 1);
    }

    #[test]
    fn split_system_rejects_late_system_messages() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::system("rules"),
        ];

        let err = split_system(&messages).unwrap_err();

        assert!(matches!(err, ValidationError::InvalidMessage { index: 2, .. }));
    }

    #[test]
    fn split_system_requires_a_conversation() {
        assert_eq!(split_system(&[]).unwrap_err(), ValidationError::EmptyMessages);
        assert!(matches!(
            split_system(&[ChatMessage::system("rules")]),
            Err(ValidationError::Unsupported(_))
        ));
    }

    #[test]
    fn empty_content_is_rejected() {
        let err = plain_text(3, &ChatMessage::user("")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMessage { index: 3, .. }));
    }
}
