#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley::conversation::types::{ConversationRecord, Message};
use parley::embedding::EmbeddingProvider;
use parley::error::{EmbeddingServiceError, InferenceServiceError, StorageError};
use parley::inference::InferenceProvider;
use parley::store::ConversationStore;

/// Deterministic embedding: a 4-dim vector derived from the text length. Can be
/// switched off to simulate an outage.
pub struct StubEmbedding {
    pub down: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubEmbedding {
    pub fn up() -> Arc<Self> {
        Arc::new(Self {
            down: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn down() -> Arc<Self> {
        let stub = Self::up();
        stub.down.store(true, Ordering::SeqCst);
        stub
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(EmbeddingServiceError::Status {
                status: 503,
                body: "embedding model unavailable".into(),
            });
        }
        let n = text.len() as f32;
        Ok(vec![n, n / 2.0, 1.0, 0.0])
    }

    fn model(&self) -> &str {
        "stub-embed"
    }
}

/// Scripted inference: answers with the next canned reply, streamed word by word,
/// and remembers the context it was given. An exhausted script is an outage.
pub struct StubInference {
    replies: Mutex<Vec<String>>,
    pub contexts: Mutex<Vec<Vec<Message>>>,
}

impl StubInference {
    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            contexts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::replying(&[])
    }

    /// Queue one more reply after those already scripted.
    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().insert(0, reply.to_string());
    }
}

#[async_trait]
impl InferenceProvider for StubInference {
    async fn complete(
        &self,
        context: &[Message],
        _prompt: &str,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, InferenceServiceError> {
        self.contexts.lock().unwrap().push(context.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| InferenceServiceError::Model("connection refused".into()))?;
        for (i, word) in reply.split(' ').enumerate() {
            if i > 0 {
                on_token(" ");
            }
            on_token(word);
        }
        Ok(reply)
    }

    fn model(&self) -> &str {
        "stub-chat"
    }
}

/// A store whose backend is unreachable.
pub struct BrokenStore;

impl ConversationStore for BrokenStore {
    fn append(&self, _record: &ConversationRecord) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }

    fn read_all(&self) -> Result<Vec<ConversationRecord>, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
}

pub fn record(query: &str, response: &str) -> ConversationRecord {
    ConversationRecord {
        query: query.into(),
        response: response.into(),
        query_embedding: vec![0.1, 0.2, 0.3],
        response_embedding: vec![0.4, 0.5, 0.6],
        timestamp: chrono::Utc::now(),
    }
}

/// Collects streamed fragments for assertions.
pub fn collector() -> (Arc<Mutex<String>>, impl FnMut(&str) + Send) {
    let out = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&out);
    (out, move |t: &str| sink.lock().unwrap().push_str(t))
}
