use std::fmt;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credential::Credential;

pub const DEFAULT_ENDPOINT: &str = "https://api.together.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const SYSTEM_PROMPT: &str = "You are LumiiShift, a friendly, safe, empathetic AI companion. \
    Provide brief, supportive responses acknowledging the user's mood. \
    Be warm, understanding, and encouraging. Keep responses under 50 words.";

/// Reply used when the endpoint answers 200 but carries no message content.
pub const FALLBACK_REPLY: &str = "I understand how you're feeling. 💙";

/// Everything that shapes the request and its transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
    pub system_prompt: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl CompletionRequest {
    /// System instruction plus a single user turn naming the mood.
    pub fn for_mood(settings: &CompletionSettings, mood_id: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: settings.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("My current mood is: {}.", mood_id),
                },
            ],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

// Every level is optional so a well-formed body with a missing field
// decodes fine and falls back instead of failing.
#[derive(Deserialize, Debug, Default)]
struct CompletionResult {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Deserialize, Debug)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResult {
    fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// Classified result of one call to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success(String),
    HttpError(u16),
    Timeout,
    NetworkError,
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionOutcome::Success(_))
    }
}

/// The text shown to the user for each outcome.
impl fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionOutcome::Success(text) => f.write_str(text),
            CompletionOutcome::HttpError(status) => {
                write!(f, "API Error: {}. Please check your API key.", status)
            }
            CompletionOutcome::Timeout => f.write_str("Request timed out. Please try again."),
            CompletionOutcome::NetworkError => {
                f.write_str("Connection error. Please check your internet connection.")
            }
        }
    }
}

impl From<reqwest::Error> for CompletionOutcome {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            warn!("Completion request timed out");
            CompletionOutcome::Timeout
        } else {
            warn!(error = %err, "Completion request failed");
            CompletionOutcome::NetworkError
        }
    }
}

#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client,
    settings: CompletionSettings,
}

impl ChatCompletionClient {
    pub fn new(settings: CompletionSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Issue exactly one POST and classify what came back. Never fails:
    /// every transport or protocol problem becomes a `CompletionOutcome`.
    pub async fn send(&self, request: &CompletionRequest, credential: &Credential) -> CompletionOutcome {
        debug!(
            endpoint = %self.settings.endpoint,
            model = %request.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Sending completion request"
        );

        let response = match self
            .client
            .post(&self.settings.endpoint)
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return err.into(),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion endpoint returned an error status");
            return CompletionOutcome::HttpError(status.as_u16());
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        match serde_json::from_slice::<CompletionResult>(&body) {
            Ok(result) => {
                let reply = result.into_reply().unwrap_or_else(|| {
                    warn!("Completion response had no message content, using fallback reply");
                    FALLBACK_REPLY.to_string()
                });
                info!(chars = reply.chars().count(), "Received completion");
                CompletionOutcome::Success(reply)
            }
            // Valid JSON with an unexpected shape
            Err(err) if err.is_data() => {
                warn!(error = %err, "Unexpected completion response shape, using fallback reply");
                CompletionOutcome::Success(FALLBACK_REPLY.to_string())
            }
            Err(err) => {
                warn!(error = %err, "Completion response was not JSON");
                CompletionOutcome::NetworkError
            }
        }
    }
}
