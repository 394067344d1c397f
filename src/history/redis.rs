use async_trait::async_trait;
use crate::models::chat::{ ChatMessage, Conversation, Sender };
use crate::history::HistoryStore;
use crate::cli::Args;
use crate::error::AgentError;
use chrono::Utc;
use log::error;
use redis::{ AsyncCommands, Client };
use serde::{ Serialize, Deserialize };

#[derive(Serialize, Deserialize)]
struct StoredMessage {
    sender: Sender,
    text: String,
    timestamp: i64,
}

/// Conversation log backed by a Redis list per conversation id. The turn
/// pair is appended with a single RPUSH of two values, so readers see
/// both entries or neither.
pub struct RedisHistoryStore {
    client: Client,
    key_prefix: String,
}

impl RedisHistoryStore {
    pub fn new(args: &Args) -> Result<Self, AgentError> {
        Ok(Self {
            client: Client::open(args.history_host.as_str())?,
            key_prefix: args.history_redis_prefix.clone(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn key_for(&self, conversation_id: &str) -> String {
        format!("{}{}", self.key_prefix, conversation_id)
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn get_conversation(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, AgentError> {
        let mut conn = self.get_connection().await?;
        let key = self.key_for(conversation_id);
        let json_entries: Vec<String> = conn.lrange(&key, 0, -1).await?;

        let mut messages = Vec::with_capacity(json_entries.len());
        for json_entry in &json_entries {
            match serde_json::from_str::<StoredMessage>(json_entry) {
                Ok(msg) => {
                    messages.push(ChatMessage {
                        sender: msg.sender,
                        text: msg.text,
                        timestamp: msg.timestamp,
                    });
                }
                Err(e) => {
                    error!("Skipping unparseable history entry for '{}': {}", conversation_id, e);
                }
            }
        }

        Ok(Conversation {
            id: conversation_id.to_string(),
            messages,
        })
    }

    async fn append_turns(
        &self,
        conversation_id: &str,
        user_text: &str,
        bot_text: &str
    ) -> Result<(), AgentError> {
        let mut conn = self.get_connection().await?;
        let key = self.key_for(conversation_id);
        let now = Utc::now().timestamp();

        let pair = vec![
            serde_json::to_string(
                &(StoredMessage {
                    sender: Sender::User,
                    text: user_text.to_string(),
                    timestamp: now,
                })
            ),
            serde_json::to_string(
                &(StoredMessage {
                    sender: Sender::Bot,
                    text: bot_text.to_string(),
                    timestamp: now,
                })
            )
        ]
            .into_iter()
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| AgentError::StorageUnavailable(format!("history encode error: {}", e)))?;

        let _: i64 = conn.rpush(&key, pair).await?;
        Ok(())
    }
}
