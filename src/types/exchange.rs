use time::OffsetDateTime;

use crate::types::{ChatReply, tokens_per_second};

/// One completed user message and its answer, ready to be written to history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    /// What the user typed.
    pub input: String,

    /// What the model answered.
    pub response: String,

    /// Total tokens billed for the exchange.
    pub total_tokens: u64,

    /// Completion time in seconds.
    pub completion_time: f64,

    /// The model that answered.
    pub model: String,

    /// When the exchange completed.
    pub timestamp: OffsetDateTime,
}

impl ChatExchange {
    /// Build an exchange from a successful reply.
    pub fn new(
        model: impl Into<String>,
        input: impl Into<String>,
        reply: ChatReply,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            input: input.into(),
            response: reply.content,
            total_tokens: reply.total_tokens,
            completion_time: reply.completion_time,
            model: model.into(),
            timestamp,
        }
    }

    /// Tokens per second for this exchange.
    pub fn tokens_per_second(&self) -> f64 {
        tokens_per_second(self.total_tokens, self.completion_time)
    }
}
