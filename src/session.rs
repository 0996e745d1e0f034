//! Session orchestration: the live chat loop state and the per-turn flow.
//!
//! A [`Session`] owns one [`SessionContext`] (transcript, model context, start time,
//! one-shot history flag) and drives each turn: inference, then display via the token callback, then
//! recording. Every failure becomes a [`Notice`]; nothing here ends the session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::TimestampMode;
use crate::conversation::history::HistoryReconstructor;
use crate::conversation::recorder::ConversationRecorder;
use crate::conversation::types::Message;
use crate::embedding::EmbeddingProvider;
use crate::error::Error;
use crate::inference::InferenceProvider;
use crate::store::ConversationStore;

/// Per-session state, initialized once at session start.
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    started_at: DateTime<Utc>,
    /// Everything shown to the user, replayed history included.
    transcript: Vec<Message>,
    /// Completed exchanges of this session only; sent to the model on each turn.
    memory: Vec<Message>,
    history_loaded: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            transcript: Vec::new(),
            memory: Vec::new(),
            history_loaded: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Messages the model sees as context: answered turns from this session.
    pub fn memory(&self) -> &[Message] {
        &self.memory
    }

    pub fn history_loaded(&self) -> bool {
        self.history_loaded
    }

    /// Claim the one history load this session gets. False if it already happened or
    /// the transcript already has content.
    fn begin_history_load(&mut self) -> bool {
        if self.history_loaded || !self.transcript.is_empty() {
            return false;
        }
        self.history_loaded = true;
        true
    }

    fn record_timestamp(&self, mode: TimestampMode) -> DateTime<Utc> {
        match mode {
            TimestampMode::Session => self.started_at,
            TimestampMode::PerTurn => Utc::now(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Store,
    History,
    Inference,
    Recording,
}

/// A user-visible, non-blocking error report.
#[derive(Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub error: Error,
}

impl Notice {
    pub fn new(kind: NoticeKind, error: impl Into<Error>) -> Self {
        let notice = Self {
            kind,
            error: error.into(),
        };
        tracing::warn!(kind = ?notice.kind, error = %notice.error, "notice");
        notice
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            NoticeKind::Store => "Error opening conversation store",
            NoticeKind::History => "Error loading conversation history",
            NoticeKind::Inference => "Error generating response",
            NoticeKind::Recording => "Error storing conversation",
        };
        write!(f, "{what}: {}", self.error)
    }
}

/// Result of one chat turn.
#[derive(Debug, Default)]
pub struct TurnOutcome {
    /// The assistant reply, absent when inference failed.
    pub reply: Option<String>,
    pub notices: Vec<Notice>,
}

pub struct Session {
    ctx: SessionContext,
    inference: Arc<dyn InferenceProvider>,
    recorder: ConversationRecorder,
    history: HistoryReconstructor,
    timestamps: TimestampMode,
}

impl Session {
    pub fn new(
        inference: Arc<dyn InferenceProvider>,
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ConversationStore>,
        timestamps: TimestampMode,
    ) -> Self {
        let ctx = SessionContext::new();
        tracing::info!(session = %ctx.id, started_at = %ctx.started_at, "session started");
        Self {
            ctx,
            inference,
            recorder: ConversationRecorder::new(embedding, Arc::clone(&store)),
            history: HistoryReconstructor::new(store),
            timestamps,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn transcript(&self) -> &[Message] {
        self.ctx.transcript()
    }

    /// Replay stored exchanges into the transcript. Only the first call in a session
    /// does anything. Replayed exchanges are for display and never reach the model.
    pub async fn load_history(&mut self) -> Vec<Notice> {
        if !self.ctx.begin_history_load() {
            tracing::debug!(session = %self.ctx.id, "history already loaded, skipping");
            return Vec::new();
        }

        let replay = self.history.reconstruct().await;
        for exchange in replay.exchanges {
            self.ctx.transcript.push(Message::user(exchange.query));
            self.ctx.transcript.push(Message::assistant(exchange.response));
        }

        replay
            .error
            .map(|e| vec![Notice::new(NoticeKind::History, e)])
            .unwrap_or_default()
    }

    /// Run one turn: send `prompt` with this session's answered turns as context,
    /// stream the reply through `on_token`, then record the exchange.
    ///
    /// A failed prompt stays in the transcript but is not remembered as context.
    pub async fn turn(
        &mut self,
        prompt: &str,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> TurnOutcome {
        self.ctx.transcript.push(Message::user(prompt));

        let reply = match self
            .inference
            .complete(&self.ctx.memory, prompt, on_token)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                return TurnOutcome {
                    reply: None,
                    notices: vec![Notice::new(NoticeKind::Inference, e)],
                }
            }
        };

        self.ctx.transcript.push(Message::assistant(reply.clone()));
        self.ctx.memory.push(Message::user(prompt));
        self.ctx.memory.push(Message::assistant(reply.clone()));

        let mut notices = Vec::new();
        let timestamp = self.ctx.record_timestamp(self.timestamps);
        if let Err(e) = self.recorder.record(prompt, &reply, timestamp).await {
            notices.push(Notice::new(NoticeKind::Recording, e));
        }

        tracing::info!(
            session = %self.ctx.id,
            turn = self.ctx.memory.len() / 2,
            recorded = notices.is_empty(),
            "turn complete"
        );

        TurnOutcome {
            reply: Some(reply),
            notices,
        }
    }
}
