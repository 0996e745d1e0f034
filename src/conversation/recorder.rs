//! Write path: embed query and response, then append one record.
//!
//! [`ConversationRecorder::record`] is the single entry point. A record is assembled
//! only after both embeddings succeed, so a failure anywhere leaves the store exactly
//! as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::conversation::types::ConversationRecord;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::{self, ConversationStore};

#[derive(Clone)]
pub struct ConversationRecorder {
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ConversationStore>,
}

impl ConversationRecorder {
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, store: Arc<dyn ConversationStore>) -> Self {
        Self { embedding, store }
    }

    /// Embed `query`, then `response`, then append the composite record.
    pub async fn record(
        &self,
        query: &str,
        response: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let query_embedding = self.embedding.embed(query).await?;
        let response_embedding = self.embedding.embed(response).await?;

        let record = ConversationRecord {
            query: query.to_string(),
            response: response.to_string(),
            query_embedding,
            response_embedding,
            timestamp,
        };

        store::append(&self.store, record).await?;

        tracing::info!(
            query_len = query.len(),
            response_len = response.len(),
            model = %self.embedding.model(),
            "conversation recorded"
        );
        Ok(())
    }
}
