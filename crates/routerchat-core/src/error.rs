use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single completion call.
///
/// The `Display` text is what the chat pane shows, so each variant reads as
/// a user-facing diagnostic.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(
        "Authorization failed (HTTP {status}). \
         Check that OPENROUTER_API_KEY is set to a valid OpenRouter API key."
    )]
    Unauthorized { status: StatusCode, body: String },

    #[error("API error (HTTP {status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected response: {raw}")]
    UnexpectedResponse { raw: String },

    #[error("Could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Request did not complete: {0}")]
    Interrupted(String),
}

impl CompletionError {
    /// Short variant name for logs. Unlike `Display`, never carries a
    /// response body.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Transport(_) => "transport",
            CompletionError::Unauthorized { .. } => "unauthorized",
            CompletionError::Status { .. } => "status",
            CompletionError::UnexpectedResponse { .. } => "unexpected_response",
            CompletionError::Encode(_) => "encode",
            CompletionError::Interrupted(_) => "interrupted",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CompletionError::Unauthorized { status, .. }
            | CompletionError::Status { status, .. } => Some(*status),
            CompletionError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Length of the response body carried by the error, if any.
    pub fn body_len(&self) -> Option<usize> {
        match self {
            CompletionError::Unauthorized { body, .. }
            | CompletionError::Status { body, .. } => Some(body.len()),
            CompletionError::UnexpectedResponse { raw } => Some(raw.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access transcript {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript {} is not a valid message list: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY not found. Set it in the environment or in a .env file.")]
    MissingApiKey,

    #[error("invalid request timeout {value:?}: expected a positive whole number of seconds")]
    InvalidTimeout { value: String },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("could not read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Still waiting for the previous reply.")]
    Busy,

    #[error("Message is empty.")]
    EmptyInput,

    #[error("No request is in flight.")]
    NotSubmitting,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Chat history could not be saved: {0}")]
    Persist(#[from] StoreError),
}
