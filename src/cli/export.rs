//! CLI `export` command: dump every stored record as JSON.

use anyhow::{Context, Result};

use parley::config::ParleyConfig;
use parley::store::{ConversationStore, SqliteStore};

/// Write all records, in insertion order, as a JSON array to stdout.
pub fn export(config: &ParleyConfig) -> Result<()> {
    let store = SqliteStore::open(&config.store).context("failed to open conversation store")?;
    let records = store.read_all().context("failed to read conversation records")?;

    let json = serde_json::to_string_pretty(&records)?;
    println!("{json}");

    tracing::info!(records = records.len(), "export complete");
    Ok(())
}
