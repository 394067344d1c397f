use crate::cli::Args;
use crate::config::script::ScriptRegistry;
use crate::context::assemble_context;
use crate::error::AgentError;
use crate::format::strip_speech_markup;
use crate::history::{ initialize_history_store, HistoryStore };
use crate::llm::LlmConfig;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::tts::{ create_tts_client, TtsClient };

use log::{ error, info };
use std::sync::Arc;

/// The conversation engine: reads history, assembles the interview
/// context, runs one completion round trip, and records the turn pair.
/// Constructed once at startup; all handles are long-lived and shared
/// across requests.
pub struct InterviewAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    scripts: Arc<ScriptRegistry>,
    tts_client: Option<Arc<dyn TtsClient>>,
}

impl InterviewAgent {
    pub async fn new(args: Args) -> Result<Self, AgentError> {
        let chat_llm_type = args.chat_llm_type
            .parse()
            .map_err(|e| AgentError::Configuration(format!("invalid chat LLM type: {}", e)))?;
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            base_url: args.chat_base_url.clone(),
            api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config).map_err(|e|
            AgentError::Configuration(format!("failed to build chat client: {}", e))
        )?;
        info!(
            "Chat client configured: Type={}, Model={}",
            args.chat_llm_type,
            chat_client.get_model()
        );

        let history_store = initialize_history_store(&args)?;
        let scripts = ScriptRegistry::load(&args.scripts_path)?;
        let tts_client = create_tts_client(&args)?;

        Ok(Self {
            chat_client,
            history_store,
            scripts,
            tts_client,
        })
    }

    /// Dependency-injecting constructor, used by tests to swap in fakes.
    pub fn with_parts(
        chat_client: Arc<dyn ChatClient>,
        history_store: Arc<dyn HistoryStore>,
        scripts: Arc<ScriptRegistry>,
        tts_client: Option<Arc<dyn TtsClient>>
    ) -> Self {
        Self {
            chat_client,
            history_store,
            scripts,
            tts_client,
        }
    }

    /// Text exchange: returns the markup-preserving reply. One turn pair
    /// is appended to history on success.
    pub async fn chat(
        &self,
        conversation_id: &str,
        prompt: &str,
        script_name: Option<&str>
    ) -> Result<String, AgentError> {
        self.exchange(conversation_id, prompt, script_name).await
    }

    /// Voice exchange: same pipeline as `chat`, then speech synthesis of
    /// the markup-stripped reply. The ORIGINAL reply text is what gets
    /// persisted, so stored history stays markup-consistent; stripping
    /// applies only to the audio input.
    pub async fn voice(
        &self,
        conversation_id: &str,
        voice_input: &str,
        script_name: Option<&str>
    ) -> Result<Vec<u8>, AgentError> {
        let reply = self.exchange(conversation_id, voice_input, script_name).await?;

        let tts = self.tts_client
            .as_ref()
            .ok_or_else(|| {
                AgentError::Configuration("voice path requested but no TTS provider is configured".to_string())
            })?;

        let spoken = strip_speech_markup(&reply);
        tts
            .synthesize(&spoken).await
            .map_err(|e| AgentError::SynthesisFailed(e.to_string()))
    }

    async fn exchange(
        &self,
        conversation_id: &str,
        new_message: &str,
        script_name: Option<&str>
    ) -> Result<String, AgentError> {
        let script = self.scripts.get(script_name)?;

        // A read failure aborts the request before any completion call.
        let conversation = self.history_store.get_conversation(conversation_id).await?;
        let context = assemble_context(script, &conversation);
        let prompt = format!("{}\n\nuser: {}", context, new_message);

        let completion = self.chat_client
            .complete(&prompt).await
            .map_err(|e| AgentError::CompletionFailed(e.to_string()))?;
        let reply = completion.response;

        // Recording is best-effort relative to response delivery: a write
        // failure is logged and the already-computed reply still returned.
        if let Err(e) = self.history_store.append_turns(conversation_id, new_message, &reply).await {
            error!("Failed to record turn pair for '{}': {}", conversation_id, e);
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::llm::chat::CompletionResponse;
    use crate::models::chat::Sender;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::error::Error as StdError;
    use tokio::sync::Mutex;

    struct StubChatClient {
        replies: Mutex<Vec<String>>,
        prompts_seen: Mutex<Vec<String>>,
    }

    impl StubChatClient {
        fn returning(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                prompts_seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatClient for StubChatClient {
        async fn complete(
            &self,
            prompt: &str
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            self.prompts_seen.lock().await.push(prompt.to_string());
            match self.replies.lock().await.pop() {
                Some(response) => Ok(CompletionResponse { response }),
                None => Err("provider timed out".into()),
            }
        }

        fn get_model(&self) -> String {
            "stub".to_string()
        }
    }

    struct StubTts;

    #[async_trait]
    impl crate::tts::TtsClient for StubTts {
        async fn synthesize(
            &self,
            text: &str
        ) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> {
            Ok(text.as_bytes().to_vec())
        }
    }

    fn registry() -> Arc<ScriptRegistry> {
        let mut scripts = HashMap::new();
        scripts.insert(
            "cardio".to_string(),
            "1. Chest Pain - Have you had any pain in your chest?".to_string()
        );
        Arc::new(ScriptRegistry::from_parts("cardio", scripts).unwrap())
    }

    fn agent_with(
        chat: Arc<StubChatClient>,
        store: Arc<MemoryHistoryStore>,
        tts: bool
    ) -> InterviewAgent {
        let tts_client: Option<Arc<dyn crate::tts::TtsClient>> = if tts {
            Some(Arc::new(StubTts))
        } else {
            None
        };
        InterviewAgent::with_parts(chat, store, registry(), tts_client)
    }

    #[tokio::test]
    async fn first_exchange_records_the_turn_pair() {
        let chat = StubChatClient::returning(&["Hi there"]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat, store.clone(), false);

        let reply = agent.chat("c1", "hello", None).await.unwrap();
        assert_eq!(reply, "Hi there");

        let conversation = store.get_conversation("c1").await.unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].sender, Sender::User);
        assert_eq!(conversation.messages[0].text, "hello");
        assert_eq!(conversation.messages[1].sender, Sender::Bot);
        assert_eq!(conversation.messages[1].text, "Hi there");
    }

    #[tokio::test]
    async fn second_exchange_sees_prior_transcript() {
        let chat = StubChatClient::returning(&["Hi there", "Good, next question"]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat.clone(), store, false);

        agent.chat("c1", "hello", None).await.unwrap();
        agent.chat("c1", "how are you", None).await.unwrap();

        let prompts = chat.prompts_seen.lock().await;
        assert_eq!(prompts.len(), 2);
        let second = &prompts[1];
        assert!(second.contains("user: hello"));
        assert!(second.contains("bot: Hi there"));
        assert!(second.ends_with("user: how are you"));
        // prior turns appear before the new message
        assert!(second.find("user: hello").unwrap() < second.rfind("user: how are you").unwrap());
    }

    #[tokio::test]
    async fn failed_completion_persists_nothing() {
        let chat = StubChatClient::returning(&[]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat, store.clone(), false);

        let result = agent.chat("c1", "hello", None).await;
        assert!(matches!(result, Err(AgentError::CompletionFailed(_))));

        let conversation = store.get_conversation("c1").await.unwrap();
        assert!(conversation.messages.is_empty());
    }

    #[tokio::test]
    async fn unknown_script_rejects_before_any_side_effect() {
        let chat = StubChatClient::returning(&["Hi there"]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat.clone(), store.clone(), false);

        let result = agent.chat("c1", "hello", Some("neuro")).await;
        assert!(matches!(result, Err(AgentError::ScriptNotFound(_))));
        assert!(chat.prompts_seen.lock().await.is_empty());
        assert!(store.get_conversation("c1").await.unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn voice_persists_original_reply_and_speaks_stripped_text() {
        let chat = StubChatClient::returning(&["**Chest pain?** Rate it *0 to 10*."]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat, store.clone(), true);

        let audio = agent.voice("c1", "hello", None).await.unwrap();
        assert_eq!(String::from_utf8(audio).unwrap(), "Chest pain? Rate it 0 to 10.");

        let conversation = store.get_conversation("c1").await.unwrap();
        assert_eq!(conversation.messages[1].text, "**Chest pain?** Rate it *0 to 10*.");
    }

    #[tokio::test]
    async fn voice_without_tts_is_a_configuration_error() {
        let chat = StubChatClient::returning(&["Hi there"]);
        let store = Arc::new(MemoryHistoryStore::new());
        let agent = agent_with(chat, store.clone(), false);

        let result = agent.voice("c1", "hello", None).await;
        assert!(matches!(result, Err(AgentError::Configuration(_))));
        // the exchange itself succeeded and was recorded before synthesis
        assert_eq!(store.get_conversation("c1").await.unwrap().messages.len(), 2);
    }
}
