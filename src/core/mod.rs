//! Core assistant components
//!
//! The dispatcher is pure; the chat engine and memory wrap it with history
//! and persistence.

mod chat;
mod dispatcher;
mod memory;

pub use chat::{ChatEngine, ChatError, ChatReply, ChatRequest};
pub use dispatcher::{Category, Dispatcher, ResponseTable, ResponseTableError};
pub use memory::{InMemoryStore, KeyValueStore, SqliteStore};
