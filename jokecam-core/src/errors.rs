// jokecam-core/src/errors.rs
use thiserror::Error;

/// Errors that can occur while capturing a photo or asking the model for a joke.
#[derive(Error, Debug)]
pub enum JokeError {
    /// No API credential configured. `ApiClient::complete` turns this into the
    /// fallback response; it is only surfaced through logging.
    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),

    /// The API answered with a non-success status.
    #[error("Anthropic API error: {status}")]
    Request { status: u16, body: String },

    /// Transport-level failure (connectivity, DNS, TLS...).
    #[error("Network Error: {0}")]
    Network(#[source] reqwest::Error),

    /// A success response whose body is not a completion.
    #[error("Failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Cannot request a completion for an empty conversation")]
    EmptyConversation,

    #[error("API response contained no content blocks")]
    EmptyResponse,

    /// Error related to configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error from the camera while taking a picture.
    #[error("Capture Error: {0}")]
    Capture(String),

    #[error("Camera permission was not granted")]
    PermissionDenied,
}

impl JokeError {
    pub fn config(msg: impl Into<String>) -> Self {
        JokeError::Config(msg.into())
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        JokeError::Capture(msg.into())
    }

    /// HTTP status carried by a `Request` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            JokeError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = JokeError> = std::result::Result<T, E>;
