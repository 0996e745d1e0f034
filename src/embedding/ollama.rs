//! Ollama embedding provider.
//!
//! Calls `POST {base_url}/api/embeddings` with `{"model", "prompt"}` and expects
//! `{"embedding": [...]}` back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingServiceError;

pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingReply {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let endpoint = format!("{}/api/embeddings", config.base_url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %config.model, "ollama embedding provider ready");
        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(EmbeddingServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let embedding = parse_embedding_reply(&body)?;
        tracing::debug!(dims = embedding.len(), text_len = text.len(), "text embedded");
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Extract the vector from an embeddings reply body. Missing or empty vectors are
/// malformed.
fn parse_embedding_reply(body: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
    let reply: EmbeddingReply = serde_json::from_str(body)
        .map_err(|e| EmbeddingServiceError::Malformed(e.to_string()))?;
    match reply.embedding {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(EmbeddingServiceError::Malformed("empty `embedding` array".into())),
        None => Err(EmbeddingServiceError::Malformed("missing `embedding` field".into())),
    }
}
