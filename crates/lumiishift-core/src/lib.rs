pub mod ai;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod effect;
pub mod error;
pub mod orchestrator;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatCompletionClient, CompletionOutcome, CompletionRequest, CompletionSettings};
pub use catalog::{MoodCatalog, MoodEntry, ThemeColor};
pub use config::Config;
pub use credential::{Credential, CredentialError, KeySource};
pub use effect::{classify, Effect};
pub use error::MoodError;
pub use orchestrator::ResponseOrchestrator;
pub use state::InteractionState;
