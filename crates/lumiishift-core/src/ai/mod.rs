pub mod completion;

pub use completion::{
    ChatCompletionClient, ChatMessage, CompletionOutcome, CompletionRequest, CompletionSettings,
    FALLBACK_REPLY,
};
