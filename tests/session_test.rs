mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use helpers::{collector, record, BrokenStore, StubEmbedding, StubInference};
use parley::config::TimestampMode;
use parley::conversation::types::{Message, Role};
use parley::error::Error;
use parley::session::{NoticeKind, Session};
use parley::store::{ConversationStore, SqliteStore};

fn session_with(
    inference: Arc<StubInference>,
    embedding: Arc<StubEmbedding>,
    store: Arc<SqliteStore>,
) -> Session {
    Session::new(inference, embedding, store, TimestampMode::Session)
}

#[tokio::test]
async fn hello_turn_stores_one_complete_record() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut session = session_with(
        StubInference::replying(&["Hi there"]),
        StubEmbedding::up(),
        store.clone(),
    );

    assert!(session.load_history().await.is_empty());
    let (streamed, mut sink) = collector();
    let outcome = session.turn("Hello", &mut sink).await;

    assert_eq!(outcome.reply.as_deref(), Some("Hi there"));
    assert!(outcome.notices.is_empty());
    assert_eq!(*streamed.lock().unwrap(), "Hi there");

    let records = store.read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query, "Hello");
    assert_eq!(records[0].response, "Hi there");
    assert!(!records[0].query_embedding.is_empty());
    assert!(!records[0].response_embedding.is_empty());
    assert_eq!(records[0].timestamp, session.context().started_at());
}

#[tokio::test]
async fn embedding_outage_keeps_reply_but_stores_nothing() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut session = session_with(
        StubInference::replying(&["Hi there"]),
        StubEmbedding::down(),
        store.clone(),
    );

    let (_, mut sink) = collector();
    let outcome = session.turn("Hello", &mut sink).await;

    assert_eq!(outcome.reply.as_deref(), Some("Hi there"));
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(outcome.notices.len(), 1);
    assert_eq!(outcome.notices[0].kind, NoticeKind::Recording);
    assert!(matches!(outcome.notices[0].error, Error::Embedding(_)));
    assert_eq!(
        session.transcript(),
        &[Message::user("Hello"), Message::assistant("Hi there")]
    );
}

#[tokio::test]
async fn inference_failure_keeps_user_message_and_skips_recording() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let embedding = StubEmbedding::up();
    let mut session = session_with(StubInference::failing(), embedding.clone(), store.clone());

    let (_, mut sink) = collector();
    let outcome = session.turn("Hello", &mut sink).await;

    assert!(outcome.reply.is_none());
    assert_eq!(outcome.notices.len(), 1);
    assert_eq!(outcome.notices[0].kind, NoticeKind::Inference);
    assert_eq!(session.transcript(), &[Message::user("Hello")]);
    assert_eq!(embedding.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn history_replays_in_order_and_only_once() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.append(&record("A", "B")).unwrap();
    store.append(&record("C", "D")).unwrap();

    let mut session = session_with(StubInference::failing(), StubEmbedding::up(), store);
    assert!(session.load_history().await.is_empty());
    assert!(session.load_history().await.is_empty());

    let contents: Vec<(Role, &str)> = session
        .transcript()
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        contents,
        vec![
            (Role::User, "A"),
            (Role::Assistant, "B"),
            (Role::User, "C"),
            (Role::Assistant, "D"),
        ]
    );
    assert!(session.context().history_loaded());
}

#[tokio::test]
async fn replayed_history_is_shown_but_not_sent_as_context() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    store.append(&record("What is Rust?", "A language.")).unwrap();
    let inference = StubInference::replying(&["Yes", "Sure"]);

    let mut session = session_with(inference.clone(), StubEmbedding::up(), store.clone());
    session.load_history().await;
    assert_eq!(session.transcript().len(), 2);
    assert!(session.context().memory().is_empty());

    let (_, mut sink) = collector();
    session.turn("Is it fast?", &mut sink).await;
    session.turn("Show me", &mut sink).await;

    let contexts = inference.contexts.lock().unwrap();
    assert!(contexts[0].is_empty());
    assert_eq!(
        contexts[1],
        vec![Message::user("Is it fast?"), Message::assistant("Yes")]
    );
    assert_eq!(session.transcript().len(), 6);
    assert_eq!(store.count().unwrap(), 3);
}

#[tokio::test]
async fn failed_prompt_is_shown_but_not_sent_as_context() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let inference = StubInference::replying(&["Hi there"]);
    let mut session = session_with(inference.clone(), StubEmbedding::up(), store.clone());

    let (_, mut sink) = collector();
    let first = session.turn("Hello", &mut sink).await;
    assert_eq!(first.reply.as_deref(), Some("Hi there"));
    let failed = session.turn("lost prompt", &mut sink).await;
    assert!(failed.reply.is_none());

    assert_eq!(
        session.transcript().last(),
        Some(&Message::user("lost prompt"))
    );
    assert_eq!(
        session.context().memory(),
        &[Message::user("Hello"), Message::assistant("Hi there")]
    );
}

#[tokio::test]
async fn turn_after_failure_sends_empty_context() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let inference = StubInference::failing();
    let mut session = session_with(inference.clone(), StubEmbedding::up(), store.clone());

    let (_, mut sink) = collector();
    assert!(session.turn("lost prompt", &mut sink).await.reply.is_none());

    inference.push_reply("second reply");
    let outcome = session.turn("second", &mut sink).await;
    assert_eq!(outcome.reply.as_deref(), Some("second reply"));

    let contexts = inference.contexts.lock().unwrap();
    assert_eq!(contexts.len(), 2);
    assert!(contexts[1].is_empty());
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn unreachable_store_fails_open_at_start_and_per_turn() {
    let mut session = Session::new(
        StubInference::replying(&["Hi there"]),
        StubEmbedding::up(),
        Arc::new(BrokenStore),
        TimestampMode::Session,
    );

    let notices = session.load_history().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::History);
    assert!(session.transcript().is_empty());

    let (_, mut sink) = collector();
    let outcome = session.turn("Hello", &mut sink).await;
    assert_eq!(outcome.reply.as_deref(), Some("Hi there"));
    assert_eq!(outcome.notices.len(), 1);
    assert!(matches!(outcome.notices[0].error, Error::Storage(_)));
}

#[tokio::test]
async fn session_timestamp_is_shared_across_turns() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut session = session_with(
        StubInference::replying(&["one", "two"]),
        StubEmbedding::up(),
        store.clone(),
    );

    let (_, mut sink) = collector();
    session.turn("first", &mut sink).await;
    session.turn("second", &mut sink).await;

    let records = store.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, records[1].timestamp);
}

#[tokio::test]
async fn per_turn_timestamps_are_not_before_session_start() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut session = Session::new(
        StubInference::replying(&["one"]),
        StubEmbedding::up(),
        store.clone(),
        TimestampMode::PerTurn,
    );

    let (_, mut sink) = collector();
    session.turn("first", &mut sink).await;

    let records = store.read_all().unwrap();
    assert!(records[0].timestamp >= session.context().started_at());
}
