//! End-to-end truncation tests
//!
//! Requests go through `ChatTruncator` exactly as a request handler would
//! drive it: wire messages in, truncated prompt and discard list out.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relay_adapter::{AdapterError, ChatTruncator, ModelPrompt, ModelRegistry};
use relay_prompt::PromptText;
use relay_protocol::{ChatCompletionRequest, ChatMessage};
use relay_truncation::{Tokenizer, TokenizerError, TruncatePromptError, TruncationError};

/// Counts whitespace-separated words and records every prompt it sees.
#[derive(Debug, Default)]
struct RecordingTokenizer {
    calls: Mutex<Vec<String>>,
}

impl RecordingTokenizer {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<P: PromptText + Sync> Tokenizer<P> for RecordingTokenizer {
    async fn count_tokens(&self, prompt: &P) -> Result<usize, TokenizerError> {
        let text = prompt.text_segments().join(" ");
        let count = text.split_whitespace().count();
        self.calls.lock().unwrap().push(text);
        Ok(count)
    }
}

fn conversation(system: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system),
        ChatMessage::user("message2"),
        ChatMessage::assistant("message3"),
        ChatMessage::user("message4"),
        ChatMessage::assistant("message5"),
        ChatMessage::user("message6"),
    ]
}

fn request(messages: Vec<ChatMessage>, max_prompt_tokens: usize) -> ChatCompletionRequest {
    ChatCompletionRequest::new(messages).with_max_prompt_tokens(max_prompt_tokens)
}

fn truncator() -> ChatTruncator {
    ChatTruncator::new(ModelRegistry::builtin())
}

fn user_limit_overflow(err: AdapterError) -> (usize, usize, String) {
    let message = err.to_string();
    match err {
        AdapterError::Truncation(TruncationError::Truncate(
            TruncatePromptError::UserLimitOverflow {
                user_limit,
                token_count,
            },
        )) => (user_limit, token_count, message),
        other => panic!("expected a user limit overflow, got {other:?}"),
    }
}

#[tokio::test]
async fn tightest_limit_keeps_system_and_last_message() {
    let tokenizer = RecordingTokenizer::default();

    let result = truncator()
        .truncate_request("chat-bison", &request(conversation("message1"), 2), &tokenizer)
        .await
        .unwrap();

    assert_eq!(result.discarded_messages, vec![1, 2, 3, 4]);
    assert_eq!(
        tokenizer.calls(),
        vec![
            "message1 message6".to_string(),
            "message1 message4 message5 message6".to_string(),
        ]
    );
}

#[tokio::test]
async fn oldest_pair_does_not_fit_in_three_tokens() {
    let tokenizer = RecordingTokenizer::default();

    let result = truncator()
        .truncate_request("chat-bison", &request(conversation("message1"), 3), &tokenizer)
        .await
        .unwrap();

    assert_eq!(result.discarded_messages, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn most_recent_pair_is_readmitted() {
    let tokenizer = RecordingTokenizer::default();

    let result = truncator()
        .truncate_request("chat-bison", &request(conversation("message1"), 4), &tokenizer)
        .await
        .unwrap();

    assert_eq!(result.discarded_messages, vec![1, 2]);
    assert_eq!(result.statistics().discarded_messages, Some(vec![1, 2]));
    let ModelPrompt::Chat(prompt) = result.prompt else {
        panic!("chat-bison should produce a chat prompt");
    };
    let turns: Vec<&str> = prompt.turns.iter().map(|turn| turn.content.as_str()).collect();
    assert_eq!(turns, vec!["message4", "message5", "message6"]);
}

#[tokio::test]
async fn oversized_required_messages_are_reported() {
    let tokenizer = RecordingTokenizer::default();

    let err = truncator()
        .truncate_request(
            "chat-bison",
            &request(conversation("message1 message1"), 2),
            &tokenizer,
        )
        .await
        .unwrap_err();

    let response = err.to_response();
    let (user_limit, token_count, message) = user_limit_overflow(err);
    assert_eq!((user_limit, token_count), (2, 3));
    assert_eq!(
        message,
        "The requested maximum prompt tokens is 2. However, the system messages and the last \
         user message resulted in 3 tokens. Please reduce the length of the messages or \
         increase the maximum prompt tokens."
    );
    assert_eq!(response.status, 422);
    assert_eq!(response.error.message, message);
}

#[tokio::test]
async fn single_oversized_message_is_reported() {
    let tokenizer = RecordingTokenizer::default();

    let err = truncator()
        .truncate_request(
            "chat-bison",
            &request(vec![ChatMessage::user("hello hello")], 1),
            &tokenizer,
        )
        .await
        .unwrap_err();

    let (user_limit, token_count, _) = user_limit_overflow(err);
    assert_eq!((user_limit, token_count), (1, 2));
}

#[tokio::test]
async fn fitting_single_message_is_tokenized_once() {
    let tokenizer = RecordingTokenizer::default();

    let result = truncator()
        .truncate_request(
            "chat-bison",
            &request(vec![ChatMessage::user("hello")], 1),
            &tokenizer,
        )
        .await
        .unwrap();

    assert!(result.discarded_messages.is_empty());
    assert_eq!(tokenizer.calls(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn shared_truncator_serves_concurrent_requests() {
    let truncator = truncator();
    let tokenizer = Arc::new(RecordingTokenizer::default());
    let tight = request(conversation("message1"), 2);
    let loose = request(conversation("message1"), 4);

    let (tight, loose) = tokio::join!(
        truncator.truncate_request("gemini-pro", &tight, &tokenizer),
        truncator.truncate_request("gemini-pro", &loose, &tokenizer),
    );

    assert_eq!(tight.unwrap().discarded_messages, vec![1, 2, 3, 4]);
    assert_eq!(loose.unwrap().discarded_messages, vec![1, 2]);
}
