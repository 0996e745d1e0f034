//! Text-to-vector embedding client.
//!
//! Provides the [`EmbeddingProvider`] trait and an Ollama implementation that calls a
//! remote embedding model over HTTP. The provider is created via [`create_provider`]
//! from configuration.

pub mod ollama;

use async_trait::async_trait;

use crate::error::EmbeddingServiceError;

/// Trait for embedding text into vectors.
///
/// One call, no retries: a failure aborts whatever recording asked for the vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError>;

    /// Identifier of the embedding model, fixed for the provider's lifetime.
    fn model(&self) -> &str;
}

/// Create an embedding provider from config.
///
/// Currently only `"ollama"` is supported.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = ollama::OllamaEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: ollama"),
    }
}
