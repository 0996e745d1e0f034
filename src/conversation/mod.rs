//! The persistence and replay pipeline.
//!
//! - [`recorder`]: embeds a finished turn and appends it as one record
//! - [`history`]: rebuilds the ordered exchange list from the store
//! - [`types`]: records, exchanges, and transcript messages

pub mod history;
pub mod recorder;
pub mod types;
