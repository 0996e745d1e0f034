//! CLI `chat` command: the interactive session.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use parley::config::ParleyConfig;
use parley::conversation::types::Role;
use parley::embedding::{self, EmbeddingProvider};
use parley::inference::ollama::OllamaChatClient;
use parley::inference::InferenceProvider;
use parley::session::{Notice, NoticeKind, Session};
use parley::store::{ConversationStore, SqliteStore, UnavailableStore};

use super::{print_message, role_label, thinking_spinner, write_token};

pub async fn chat(config: &ParleyConfig) -> Result<()> {
    let store: Arc<dyn ConversationStore> = match SqliteStore::open(&config.store) {
        Ok(store) => {
            warn_on_model_mismatch(&store, &config.embedding.model);
            Arc::new(store)
        }
        Err(e) => {
            let reason = e.to_string();
            report(&[Notice::new(NoticeKind::Store, e)]);
            Arc::new(UnavailableStore::new(reason))
        }
    };

    let embedding: Arc<dyn EmbeddingProvider> =
        Arc::from(embedding::create_provider(&config.embedding)?);
    let inference: Arc<dyn InferenceProvider> = Arc::new(
        OllamaChatClient::new(&config.inference).context("failed to build inference client")?,
    );

    let mut session = Session::new(
        inference,
        embedding,
        store,
        config.session.record_timestamps,
    );

    let notices = session.load_history().await;
    report(&notices);
    for message in session.transcript() {
        print_message(message);
    }

    println!(
        "Chatting with {} (type /quit to leave)",
        config.inference.model
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[{}] ", role_label(Role::User));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if matches!(prompt, "/quit" | "/exit") {
            break;
        }

        let spinner = thinking_spinner();
        let mut started = false;
        let ticker = spinner.clone();
        let mut on_token = move |token: &str| {
            if !started {
                ticker.finish_and_clear();
                print!("[{}] ", role_label(Role::Assistant));
                started = true;
            }
            write_token(&mut std::io::stdout(), token);
        };

        let outcome = session.turn(prompt, &mut on_token).await;
        spinner.finish_and_clear();
        if outcome.reply.is_some() {
            println!();
        }
        report(&outcome.notices);
    }

    tracing::info!(
        session = %session.context().id(),
        messages = session.transcript().len(),
        "session ended"
    );
    Ok(())
}

fn report(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{notice}");
    }
}

fn warn_on_model_mismatch(store: &SqliteStore, configured: &str) {
    match store.claim_embedding_model(configured) {
        Ok(Some(stored)) => tracing::warn!(
            stored = %stored,
            configured = %configured,
            "embedding model changed; stored vectors came from a different model"
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "could not check stored embedding model"),
    }
}
