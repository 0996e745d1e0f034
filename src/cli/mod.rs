pub mod chat;
pub mod doctor;
pub mod export;
pub mod history;

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use parley::conversation::types::{Message, Role};

/// Spinner shown on stderr while waiting for the model.
pub fn thinking_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Thinking...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

pub fn print_message(message: &Message) {
    println!("[{}] {}", role_label(message.role), message.content);
}

/// Write one streamed fragment and flush it so it shows up immediately. A broken
/// stdout only loses display output, so errors are logged and the turn goes on.
pub fn write_token(out: &mut impl Write, token: &str) {
    if let Err(e) = out.write_all(token.as_bytes()).and_then(|()| out.flush()) {
        tracing::debug!(error = %e, "failed to write streamed token");
    }
}
