//! Terminal chat for local LLMs with persistent, embedded conversation history.
//!
//! Parley relays prompts to an [Ollama](https://ollama.com/) model, streams the reply
//! back, and stores every finished turn, along with embeddings of both sides, as one
//! document in a local store. When a new session starts, the stored turns are
//! replayed into the transcript.
//!
//! # Architecture
//!
//! - **Inference**: Ollama `/api/chat`, streamed as NDJSON
//! - **Embeddings**: Ollama `/api/embeddings` with a dedicated embedding model
//! - **Storage**: SQLite, one JSON document per turn, ordered by an autoincrementing key
//! - **Failure policy**: every error in the pipeline becomes a non-fatal notice
//!
//! # Modules
//!
//! - [`config`]: configuration from built-in defaults, an optional TOML file, and env vars
//! - [`conversation`]: record types, the recorder (write path) and history replay (read path)
//! - [`embedding`]: text-to-vector client
//! - [`error`]: error taxonomy
//! - [`inference`]: streaming chat completion client
//! - [`session`]: per-session state and the turn loop
//! - [`store`]: the append-only conversation store

pub mod config;
pub mod conversation;
pub mod embedding;
pub mod error;
pub mod inference;
pub mod session;
pub mod store;

pub use error::{Error, Result};
