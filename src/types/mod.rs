// Public modules
pub mod chat_completion;
pub mod exchange;
pub mod model_info;
pub mod usage;

// Re-exports
pub use chat_completion::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatReply, Choice, ChoiceMessage,
    MessageRole,
};
pub use exchange::ChatExchange;
pub use model_info::{ModelDescriptor, ModelEntry, ModelList};
pub use usage::{CompletionUsage, tokens_per_second};
