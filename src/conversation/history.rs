//! Read path: rebuild the ordered list of past exchanges.
//!
//! Replay fails open. A store error yields an empty list plus the error, so a session
//! can always start. Running it at most once per session is the caller's job; see
//! [`SessionContext`](crate::session::SessionContext).

use std::sync::Arc;

use crate::conversation::types::Exchange;
use crate::error::StorageError;
use crate::store::{self, ConversationStore};

/// Outcome of a history load.
#[derive(Debug, Default)]
pub struct Replay {
    /// Past exchanges in insertion order. Empty when `error` is set.
    pub exchanges: Vec<Exchange>,
    pub error: Option<StorageError>,
}

pub struct HistoryReconstructor {
    store: Arc<dyn ConversationStore>,
}

impl HistoryReconstructor {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn reconstruct(&self) -> Replay {
        match store::read_all(&self.store).await {
            Ok(records) => {
                let exchanges: Vec<Exchange> = records.into_iter().map(Exchange::from).collect();
                tracing::info!(exchanges = exchanges.len(), "conversation history loaded");
                Replay {
                    exchanges,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load conversation history");
                Replay {
                    exchanges: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }
}
