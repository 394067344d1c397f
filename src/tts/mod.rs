mod elevenlabs;
mod google;

pub use elevenlabs::ElevenLabsTtsClient;
pub use google::GoogleTtsClient;

use async_trait::async_trait;
use log::info;
use std::error::Error as StdError;
use std::sync::Arc;
use crate::cli::Args;
use crate::error::AgentError;

/// One call to the TTS provider: text in, encoded MP3 bytes out. No
/// conversation state, no retries.
#[async_trait]
pub trait TtsClient: Send + Sync {
    async fn synthesize(
        &self,
        text: &str
    ) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>>;
}

/// Builds the TTS client for the configured provider. Returns `None`
/// when no API key is set, leaving the text path fully functional; the
/// voice endpoint then rejects requests with a configuration error.
pub fn create_tts_client(args: &Args) -> Result<Option<Arc<dyn TtsClient>>, AgentError> {
    if args.tts_api_key.is_empty() {
        info!("No TTS API key configured, voice path disabled");
        return Ok(None);
    }

    let client: Arc<dyn TtsClient> = match args.tts_provider.to_lowercase().as_str() {
        "google" =>
            Arc::new(
                GoogleTtsClient::new(
                    args.tts_api_key.clone(),
                    args.tts_voice.clone(),
                    args.tts_language.clone()
                )
            ),
        "elevenlabs" =>
            Arc::new(ElevenLabsTtsClient::new(args.tts_api_key.clone(), args.tts_voice.clone())),
        other => {
            return Err(
                AgentError::Configuration(format!("unsupported TTS provider: {}", other))
            );
        }
    };
    info!("TTS client configured: {} voice={}", args.tts_provider, args.tts_voice);
    Ok(Some(client))
}
