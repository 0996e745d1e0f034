mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parley::config::ParleyConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley", version, about = "Chat with a local LLM, keeping history with embeddings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (default)
    Chat,
    /// Print stored exchanges in order
    History,
    /// Dump every stored record, embeddings included, as JSON
    Export,
    /// Check the store and the Ollama endpoints
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ParleyConfig::load()?;

    // Log to stderr so stdout stays clean for the transcript.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cli::chat::chat(&config).await?,
        Command::History => cli::history::history(&config).await?,
        Command::Export => cli::export::export(&config)?,
        Command::Doctor => cli::doctor::doctor(&config).await?,
    }

    Ok(())
}
