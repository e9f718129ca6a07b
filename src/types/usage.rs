use serde::{Deserialize, Serialize};

/// Usage information for a chat completion.
///
/// OpenAI-compatible providers report token counts; Groq additionally reports how long the
/// completion took on its side.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionUsage {
    /// The number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// The number of tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Prompt plus completion tokens.
    #[serde(default)]
    pub total_tokens: u64,

    /// Server-side completion time in seconds, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<f64>,
}

impl CompletionUsage {
    /// Returns the server-reported completion time if it is positive.
    pub fn reported_completion_time(&self) -> Option<f64> {
        self.completion_time.filter(|secs| *secs > 0.0)
    }
}

/// Tokens per second, or exactly zero when `seconds` is not positive.
pub fn tokens_per_second(total_tokens: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        total_tokens as f64 / seconds
    } else {
        0.0
    }
}
