use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error};

use crate::ai::{ChatCompletionClient, CompletionOutcome, CompletionRequest, CompletionSettings};
use crate::catalog::MoodCatalog;
use crate::credential::Credential;
use crate::error::MoodError;
use crate::state::InteractionState;

/// Turns a mood selection into one chat-completion call and records the
/// result in the caller's `InteractionState`.
///
/// Cheap to clone, so a UI can move a copy into a background task. Holds no
/// per-session data itself.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    catalog: Arc<MoodCatalog>,
    client: ChatCompletionClient,
}

impl ResponseOrchestrator {
    pub fn new(catalog: MoodCatalog, settings: CompletionSettings) -> Result<Self> {
        Ok(Self::with_client(catalog, ChatCompletionClient::new(settings)?))
    }

    pub fn with_client(catalog: MoodCatalog, client: ChatCompletionClient) -> Self {
        Self {
            catalog: Arc::new(catalog),
            client,
        }
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &CompletionSettings {
        self.client.settings()
    }

    /// Look up the mood and make the call, without touching any state.
    ///
    /// Only an unknown mood is an error, and in that case no request is
    /// sent. Remote failures come back as a non-success outcome.
    pub async fn complete(
        &self,
        mood_id: &str,
        credential: &Credential,
    ) -> Result<CompletionOutcome, MoodError> {
        let entry = self.catalog.lookup(mood_id).map_err(|err| {
            error!(mood = mood_id, "Mood is not in the catalog");
            err
        })?;

        let request = CompletionRequest::for_mood(self.client.settings(), entry.id);
        let outcome = self.client.send(&request, credential).await;
        debug!(mood = entry.id, success = outcome.is_success(), "Completion settled");
        Ok(outcome)
    }

    /// `complete`, then record the mood and the rendered outcome in `state`.
    /// On `UnknownMood` the state is left as it was.
    pub async fn respond(
        &self,
        state: &mut InteractionState,
        mood_id: &str,
        credential: &Credential,
    ) -> Result<CompletionOutcome, MoodError> {
        let outcome = self.complete(mood_id, credential).await?;
        state.record(mood_id, &outcome);
        Ok(outcome)
    }
}
