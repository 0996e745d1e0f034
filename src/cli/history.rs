//! CLI `history` command: print stored exchanges in replay order.

use std::sync::Arc;

use anyhow::Result;

use parley::config::ParleyConfig;
use parley::conversation::history::HistoryReconstructor;
use parley::conversation::types::Message;
use parley::session::{Notice, NoticeKind};
use parley::store::SqliteStore;

use super::print_message;

/// Print every stored exchange. Store errors are reported, not returned.
pub async fn history(config: &ParleyConfig) -> Result<()> {
    let store = match SqliteStore::open(&config.store) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("{}", Notice::new(NoticeKind::Store, e));
            return Ok(());
        }
    };

    let replay = HistoryReconstructor::new(store).reconstruct().await;
    if let Some(e) = replay.error {
        eprintln!("{}", Notice::new(NoticeKind::History, e));
    }

    if replay.exchanges.is_empty() {
        println!("No conversations stored yet.");
        return Ok(());
    }

    for exchange in replay.exchanges {
        print_message(&Message::user(exchange.query));
        print_message(&Message::assistant(exchange.response));
        println!();
    }
    Ok(())
}
