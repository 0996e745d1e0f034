//! Ollama chat client.
//!
//! Sends `POST {base_url}/api/chat` with `"stream": true` and reads the reply as
//! newline-delimited JSON: one `{"message": {"content": ...}, "done": false}` object
//! per fragment, ending with `"done": true`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceProvider;
use crate::config::InferenceConfig;
use crate::conversation::types::Message;
use crate::error::InferenceServiceError;

pub struct OllamaChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a Message>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

impl OllamaChatClient {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let endpoint = format!("{}/api/chat", config.base_url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %config.model, "ollama chat client ready");
        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl InferenceProvider for OllamaChatClient {
    async fn complete(
        &self,
        context: &[Message],
        prompt: &str,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, InferenceServiceError> {
        let user = Message::user(prompt);
        let mut messages: Vec<&Message> = context.iter().collect();
        messages.push(&user);

        let mut resp = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: true,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "failed to read error body");
                    String::new()
                }
            };
            return Err(InferenceServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut stream = ChatStream::default();
        while let Some(bytes) = resp.chunk().await? {
            for line in stream.push(&bytes) {
                stream.apply(&line, on_token)?;
            }
            if stream.done {
                break;
            }
        }
        if let Some(line) = stream.take_remainder() {
            stream.apply(&line, on_token)?;
        }

        if !stream.done {
            return Err(InferenceServiceError::Malformed(
                "stream ended before the final chunk".into(),
            ));
        }

        tracing::debug!(reply_len = stream.reply.len(), "completion finished");
        Ok(stream.reply)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Incremental decoder for the NDJSON chat stream. HTTP chunk boundaries do not line
/// up with JSON lines, so partial lines are buffered until their newline arrives.
#[derive(Default)]
struct ChatStream {
    buf: Vec<u8>,
    reply: String,
    done: bool,
}

impl ChatStream {
    /// Feed raw bytes; returns every complete, non-blank line.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    /// Whatever is left after the body ends without a trailing newline.
    fn take_remainder(&mut self) -> Option<String> {
        let rest = String::from_utf8_lossy(&std::mem::take(&mut self.buf))
            .trim()
            .to_string();
        (!rest.is_empty()).then_some(rest)
    }

    fn apply(
        &mut self,
        line: &str,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<(), InferenceServiceError> {
        let chunk: ChatChunk = serde_json::from_str(line)
            .map_err(|e| InferenceServiceError::Malformed(e.to_string()))?;
        if let Some(error) = chunk.error {
            return Err(InferenceServiceError::Model(error));
        }
        if let Some(message) = chunk.message {
            if !message.content.is_empty() {
                on_token(&message.content);
                self.reply.push_str(&message.content);
            }
        }
        if chunk.done {
            self.done = true;
        }
        Ok(())
    }
}
