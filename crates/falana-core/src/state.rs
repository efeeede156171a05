//! UI-agnostic conversation types
//!
//! These mirror the backend's wire format. The backend calls the sender field
//! `type`; inside the client it is a [`Role`].

use serde::{Deserialize, Serialize};

/// A single entry in a thread's transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
    /// Any other sender the backend reports (system, tool, ...). Never rendered.
    #[serde(other)]
    Other,
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }

    pub fn is_displayable(&self) -> bool {
        self.role != Role::Other
    }
}

/// Body shape shared by the history and send endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptResponse {
    pub message: Vec<Message>,
}
