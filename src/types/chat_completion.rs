use serde::{Deserialize, Serialize};

use crate::types::CompletionUsage;

/// Role of a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,
}

/// A single message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: MessageRole,

    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// The body of a `POST /chat/completions` request.
///
/// Every request carries exactly one user message; no prior turns are replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The model that should answer.
    pub model: String,

    /// The conversation to complete.
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// Create a single-turn request for `model`.
    pub fn single_turn(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(message)],
        }
    }
}

/// The message inside a completion choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text.  Providers send `null` for tool-only answers.
    #[serde(default)]
    pub content: Option<String>,
}

/// One completion candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// The generated message.
    #[serde(default)]
    pub message: ChoiceMessage,
}

/// The body of a `POST /chat/completions` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion candidates; the first one is the answer.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token and timing accounting.
    #[serde(default)]
    pub usage: CompletionUsage,
}

impl ChatCompletionResponse {
    /// Returns the first choice's content if it is present and not blank.
    pub fn answer(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}

/// The decoded result of a successful chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// The answer text; never empty.
    pub content: String,

    /// Total tokens billed for the exchange.
    pub total_tokens: u64,

    /// Completion time in seconds; always positive.
    pub completion_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_single_user_turn() {
        let request = ChatCompletionRequest::single_turn("llama3-8b-8192", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama3-8b-8192",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn only_user_messages_are_sent() {
        assert_eq!(
            serde_json::to_value(ChatMessage::user("hi")).unwrap(),
            serde_json::json!({"role": "user", "content": "hi"})
        );
        assert!(serde_json::from_value::<MessageRole>(serde_json::json!("assistant")).is_err());
    }

    #[test]
    fn response_answer_is_first_choice() {
        let json = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"total_tokens": 12, "completion_time": 0.25}
        });
        let response: ChatCompletionResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.answer(), Some("first"));
        assert_eq!(response.usage.total_tokens, 12);
        assert_eq!(response.usage.completion_time, Some(0.25));
    }

    #[test]
    fn blank_or_missing_content_has_no_answer() {
        let blank: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "   "}}]
        }))
        .unwrap();
        assert_eq!(blank.answer(), None);

        let null: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert_eq!(null.answer(), None);

        let none: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert_eq!(none.answer(), None);
    }
}
