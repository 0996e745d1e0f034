//! CLI `doctor` command: check the store and the Ollama endpoints, print a report.

use anyhow::{Context, Result};

use parley::config::ParleyConfig;
use parley::store::{ConversationStore, SqliteStore, StoreLocation};

/// Run diagnostics and print a health report.
pub async fn doctor(config: &ParleyConfig) -> Result<()> {
    let location = StoreLocation::resolve(&config.store);
    if let StoreLocation::File(ref path) = location {
        if !path.exists() {
            println!("Store: not found at {}", path.display());
            println!("Run `parley chat` to create it.");
            return Ok(());
        }
    }

    let store = SqliteStore::open(&config.store)
        .context("failed to open conversation store (may be corrupt)")?;

    let file_size = match store.location() {
        StoreLocation::File(path) => std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        StoreLocation::Memory => 0,
    };

    println!("Parley Health Report");
    println!("====================");
    println!();
    println!("Store:             {}", store.location());
    println!("Collection:        {}", store.collection());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", store.schema_version()?);
    println!("Records:           {}", store.count()?);
    println!();

    let stored_model = store.embedding_model()?;
    println!("Embedding model:");
    println!("  Stored:          {}", stored_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    if let Some(ref stored) = stored_model {
        if stored != &config.embedding.model {
            println!("  WARNING: model mismatch! New records will not be comparable with old ones.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    println!();

    println!("Ollama:");
    println!(
        "  Inference:       {} ({})",
        config.inference.base_url,
        probe(&config.inference.base_url).await
    );
    if config.embedding.base_url != config.inference.base_url {
        println!(
            "  Embedding:       {} ({})",
            config.embedding.base_url,
            probe(&config.embedding.base_url).await
        );
    }

    Ok(())
}

/// `GET /api/version` against an Ollama base URL.
async fn probe(base_url: &str) -> String {
    let url = format!("{}/api/version", base_url.trim_end_matches('/'));
    match reqwest::get(&url).await {
        Ok(resp) if resp.status().is_success() => "reachable".into(),
        Ok(resp) => format!("HTTP {}", resp.status()),
        Err(e) => format!("unreachable: {e}"),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
