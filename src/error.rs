use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("Step {0} failed")]
    Step(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generative service: {0}")]
    Service(#[from] ServiceError),
}

/// Failures reported by a generative-text service.
///
/// These are surfaced verbatim to the caller of the paraphrase and email
/// operations. The chat session turns them into a generic retryable reply.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("API Key is missing.")]
    MissingApiKey,

    #[error("API key was rejected by the service")]
    InvalidKey,

    #[error("Rate limit or quota exceeded")]
    RateLimit,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No response generated from the service.")]
    EmptyResponse,

    #[error("Unable to decode service response: {0}")]
    Decode(String),
}
