//! Conversation type definitions.
//!
//! Defines [`ConversationRecord`] (the persisted document), [`Exchange`] (a replayed
//! query/response pair), and [`Message`]/[`Role`] (the in-memory transcript).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted chat turn, stored as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// The user's turn.
    pub query: String,
    /// The model's reply to that turn.
    pub response: String,
    /// Embedding of `query`. Length is fixed by the embedding model.
    pub query_embedding: Vec<f32>,
    /// Embedding of `response`, same shape as `query_embedding`.
    pub response_embedding: Vec<f32>,
    /// Session start time by default; see `TimestampMode`.
    pub timestamp: DateTime<Utc>,
}

/// A `(query, response)` pair replayed from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub query: String,
    pub response: String,
}

impl From<ConversationRecord> for Exchange {
    fn from(record: ConversationRecord) -> Self {
        Self {
            query: record.query,
            response: record.response,
        }
    }
}

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the visible transcript, also sent to the model as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
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
