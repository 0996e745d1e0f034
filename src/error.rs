//! Error taxonomy for the chat pipeline.
//!
//! None of these are fatal: the [`Session`](crate::session::Session) turns each one
//! into a [`Notice`](crate::session::Notice) and keeps the conversation going.

use thiserror::Error;

/// The embedding backend was unreachable or answered with something unusable.
#[derive(Debug, Error)]
pub enum EmbeddingServiceError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed embedding reply: {0}")]
    Malformed(String),
}

/// The conversation store could not be opened, written, or read.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to prepare store location {path}: {source}")]
    Location {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid store namespace {0:?}: expected a plain identifier")]
    InvalidName(String),
    #[error("corrupt document at seq {seq}: {source}")]
    Corrupt {
        seq: i64,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store task failed: {0}")]
    Task(String),
}

/// The inference backend failed to produce a reply.
#[derive(Debug, Error)]
pub enum InferenceServiceError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model reported an error: {0}")]
    Model(String),
    #[error("malformed inference stream: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Embedding(#[from] EmbeddingServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Inference(#[from] InferenceServiceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
