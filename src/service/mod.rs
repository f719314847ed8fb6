//! Integration with a hosted generative-text service.
//!
//! The model itself is an external collaborator reached through
//! [`GenerativeTextService`]. This module owns what is sent to it (prompts,
//! response schemas, ordered chat history) and what is made of its replies
//! (typed paraphrase options and email drafts).

use log::{debug, error};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ServiceError;

/// Ordered, append-only chat history and its session.
pub mod chat;

/// Prompt text and structured-output schemas.
pub mod prompts;

#[cfg(feature = "gemini")]
/// Blocking client for the Google Generative Language REST API.
pub mod gemini;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One prior turn forwarded to the service as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Everything the service needs for one generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Earlier turns, oldest first. Order is significant.
    pub history: Vec<ChatTurn>,
    /// When set, the reply must be JSON conforming to this schema.
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A hosted model that turns a prompt (plus optional history and schema)
/// into text.
pub trait GenerativeTextService {
    /// Returns the raw reply text; JSON when a schema was requested.
    fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

/// One paraphrased variant of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaphraseOption {
    pub tone: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Asks the service for tone-varied paraphrases of `message`.
pub fn generate_paraphrased_options(
    service: &dyn GenerativeTextService,
    message: &str,
) -> Result<Vec<ParaphraseOption>, ServiceError> {
    let request = GenerationRequest::new(prompts::paraphrase_prompt(message))
        .with_schema(prompts::paraphrase_schema());

    generate_json(service, &request).inspect_err(|err| {
        error!("Generative service error (paraphrase): {}", err);
    })
}

/// Asks the service to draft an email carrying `message` in `tone`.
pub fn generate_email_draft(
    service: &dyn GenerativeTextService,
    message: &str,
    tone: &str,
) -> Result<EmailDraft, ServiceError> {
    let request = GenerationRequest::new(prompts::email_prompt(message, tone))
        .with_schema(prompts::email_schema());

    generate_json(service, &request).inspect_err(|err| {
        error!("Generative service error (email): {}", err);
    })
}

/// Tone filter value that keeps every option.
pub const ALL_TONES: &str = "All";

/// [`ALL_TONES`] followed by the distinct tones of `options`, in order of
/// first appearance.
pub fn tone_filters(options: &[ParaphraseOption]) -> Vec<&str> {
    let mut tones = vec![ALL_TONES];
    for option in options {
        if !tones.contains(&option.tone.as_str()) {
            tones.push(&option.tone);
        }
    }
    tones
}

/// Options whose tone equals `tone` exactly, or all of them for [`ALL_TONES`].
pub fn filter_by_tone<'a>(
    options: &'a [ParaphraseOption],
    tone: &str,
) -> Vec<&'a ParaphraseOption> {
    options
        .iter()
        .filter(|option| tone == ALL_TONES || option.tone == tone)
        .collect()
}

fn generate_json<T: DeserializeOwned>(
    service: &dyn GenerativeTextService,
    request: &GenerationRequest,
) -> Result<T, ServiceError> {
    let text = service.generate(request)?;

    if text.trim().is_empty() {
        return Err(ServiceError::EmptyResponse);
    }

    debug!("Decoding {} bytes of structured output", text.len());
    serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))
}
