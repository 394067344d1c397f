use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use crate::error::AgentError;
use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation, Sender };

/// In-process conversation log, for local development and tests. The
/// write lock covers both pushes of a turn pair, so readers never see a
/// half-written pair.
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get_conversation(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, AgentError> {
        let conversations = self.conversations.read().await;
        let messages = conversations.get(conversation_id).cloned().unwrap_or_default();
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
        let now = Utc::now().timestamp();
        let mut conversations = self.conversations.write().await;
        let messages = conversations.entry(conversation_id.to_string()).or_default();
        messages.push(ChatMessage {
            sender: Sender::User,
            text: user_text.to_string(),
            timestamp: now,
        });
        messages.push(ChatMessage {
            sender: Sender::Bot,
            text: bot_text.to_string(),
            timestamp: now,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_conversation_reads_empty() {
        let store = MemoryHistoryStore::new();
        let conversation = store.get_conversation("nope").await.unwrap();
        assert_eq!(conversation.id, "nope");
        assert!(conversation.messages.is_empty());
    }

    #[tokio::test]
    async fn first_append_creates_conversation() {
        let store = MemoryHistoryStore::new();
        store.append_turns("c1", "hello", "Hi there").await.unwrap();

        let conversation = store.get_conversation("c1").await.unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].sender, Sender::User);
        assert_eq!(conversation.messages[0].text, "hello");
        assert_eq!(conversation.messages[1].sender, Sender::Bot);
        assert_eq!(conversation.messages[1].text, "Hi there");
    }

    #[tokio::test]
    async fn appends_preserve_insertion_order() {
        let store = MemoryHistoryStore::new();
        for i in 0..5 {
            store
                .append_turns("c1", &format!("q{}", i), &format!("a{}", i)).await
                .unwrap();
        }

        let conversation = store.get_conversation("c1").await.unwrap();
        assert_eq!(conversation.messages.len(), 10);
        for i in 0..5 {
            assert_eq!(conversation.messages[2 * i].text, format!("q{}", i));
            assert_eq!(conversation.messages[2 * i + 1].text, format!("a{}", i));
        }
    }

    #[tokio::test]
    async fn concurrent_appends_never_split_a_pair() {
        let store = Arc::new(MemoryHistoryStore::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(
                tokio::spawn(async move {
                    store.append_turns("c1", &format!("q{}", i), &format!("a{}", i)).await
                })
            );
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let conversation = store.get_conversation("c1").await.unwrap();
        assert_eq!(conversation.messages.len(), 40);
        for pair in conversation.messages.chunks(2) {
            assert_eq!(pair[0].sender, Sender::User);
            assert_eq!(pair[1].sender, Sender::Bot);
            // each bot turn answers the user turn it was appended with
            assert_eq!(pair[0].text.trim_start_matches('q'), pair[1].text.trim_start_matches('a'));
        }
    }

    #[tokio::test]
    async fn conversations_are_isolated_by_id() {
        let store = MemoryHistoryStore::new();
        store.append_turns("a", "hello", "hi").await.unwrap();
        store.append_turns("b", "bonjour", "salut").await.unwrap();

        assert_eq!(store.get_conversation("a").await.unwrap().messages.len(), 2);
        assert_eq!(store.get_conversation("b").await.unwrap().messages.len(), 2);
        assert_eq!(store.get_conversation("b").await.unwrap().messages[0].text, "bonjour");
    }
}
