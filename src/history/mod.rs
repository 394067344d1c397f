mod memory;
mod redis;

pub use self::memory::MemoryHistoryStore;
pub use self::redis::RedisHistoryStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use crate::cli::Args;
use crate::error::AgentError;
use crate::models::chat::Conversation;

/// Append-only, conversation-keyed log of turns.
///
/// A conversation is created implicitly by its first append. Reads on an
/// unknown id return an empty conversation, never an error. The store
/// preserves insertion order exactly and exposes no update or delete.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn get_conversation(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, AgentError>;

    /// Appends one user turn followed by one bot turn, atomically with
    /// respect to concurrent readers: a `get_conversation` never observes
    /// only one of the pair. Timestamps are assigned here, at write time.
    async fn append_turns(
        &self,
        conversation_id: &str,
        user_text: &str,
        bot_text: &str
    ) -> Result<(), AgentError>;
}

pub fn create_history_store(args: &Args) -> Result<Arc<dyn HistoryStore>, AgentError> {
    match args.history_type.to_lowercase().as_str() {
        "redis" => {
            let store = RedisHistoryStore::new(args)?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryHistoryStore::new())),
        other =>
            Err(AgentError::Configuration(format!("unsupported history store type: {}", other))),
    }
}

pub fn initialize_history_store(args: &Args) -> Result<Arc<dyn HistoryStore>, AgentError> {
    info!("Conversation history will be stored in: {} at {}", args.history_type, args.history_host);
    create_history_store(args)
}
