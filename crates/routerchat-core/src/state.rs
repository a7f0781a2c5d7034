//! UI-agnostic chat types
//!
//! These are the records written to the transcript file and sent to the
//! completion endpoint, so the serialized form is part of the wire format.

use serde::{Deserialize, Serialize};

/// Persona text that seeds every fresh transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and helpful assistant.";

/// An ordered chat transcript. Index 0 holds the system message.
pub type Transcript = Vec<Message>;

/// A single role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A transcript holding only the default system message.
pub fn default_transcript() -> Transcript {
    vec![Message::system(DEFAULT_SYSTEM_PROMPT)]
}
