//! Inference client: streams a chat completion from the language model.
//!
//! The model sees the answered turns of the current session as context plus the new
//! prompt. Fragments are handed to the caller as they arrive; the full reply is
//! returned at the end.

pub mod ollama;

use async_trait::async_trait;

use crate::conversation::types::Message;
use crate::error::InferenceServiceError;

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Generate a reply to `prompt` given the earlier `context`.
    ///
    /// `on_token` receives each fragment in order; the returned string is their
    /// concatenation.
    async fn complete(
        &self,
        context: &[Message],
        prompt: &str,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, InferenceServiceError>;

    fn model(&self) -> &str;
}
