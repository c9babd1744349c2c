//! UI-agnostic interaction state
//!
//! One `InteractionState` lives for one user session. The presentation layer
//! owns it and hands it to the orchestrator; nothing here is global.

use serde::Serialize;

use crate::ai::CompletionOutcome;

/// The selected mood and the reply shown for it.
///
/// Fields are private so they can only change together through `record`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    selected_mood: Option<String>,
    last_reply: String,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_mood(&self) -> Option<&str> {
        self.selected_mood.as_deref()
    }

    pub fn last_reply(&self) -> &str {
        &self.last_reply
    }

    /// Overwrite both fields with the latest selection. Whatever was there
    /// before is discarded.
    pub fn record(&mut self, mood_id: &str, outcome: &CompletionOutcome) {
        *self = Self {
            selected_mood: Some(mood_id.to_string()),
            last_reply: outcome.to_string(),
        };
    }
}
