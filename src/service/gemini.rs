//! Google Gemini `generateContent` client.
//!
//! Talks to the native REST endpoint
//! `{base_url}/models/{model}:generateContent` so that structured output
//! (`responseMimeType` + `responseSchema`) can be requested.

use std::{env, time::Duration};

use log::{debug, info};
use reqwest::{StatusCode, blocking::Client};
use serde::{Deserialize, Serialize};

use super::{ChatRole, GenerationRequest, GenerativeTextService};
use crate::error::ServiceError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "API_KEY";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

fn text_content(role: ChatRole, text: &str) -> Content {
    Content {
        role: Some(role_name(role).to_string()),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

/// History first, then the new prompt as the last user turn.
fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request
        .history
        .iter()
        .map(|turn| text_content(turn.role, &turn.text))
        .collect();
    contents.push(text_content(ChatRole::User, &request.prompt));

    GenerateContentRequest {
        contents,
        generation_config: request
            .response_schema
            .as_ref()
            .map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            }),
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, ServiceError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ServiceError::EmptyResponse);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl GenerativeTextService for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let body = build_body(request);
        debug!(
            "POST {} ({} contents, structured: {})",
            self.endpoint(),
            body.contents.len(),
            body.generation_config.is_some()
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::InvalidKey);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimit);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateContentResponse = resp
            .json()
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        extract_text(response)
    }
}

/// Builder for [`GeminiClient`].
///
/// The API key is mandatory; [`GeminiClientBuilder::from_env`] takes it from
/// the `API_KEY` environment variable.
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_env() -> Self {
        let builder = Self::new();
        match env::var(API_KEY_VAR) {
            Ok(key) => builder.api_key(&key),
            Err(_) => builder,
        }
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient, ServiceError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        info!("Generative service client ready (model {})", self.model);

        Ok(GeminiClient {
            api_key,
            model: self.model,
            base_url: self.base_url,
            client,
        })
    }
}
