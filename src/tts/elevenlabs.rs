use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::error::Error as StdError;

use super::TtsClient;

const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Serialize)]
struct ElevenLabsRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

pub struct ElevenLabsTtsClient {
    http: HttpClient,
    api_key: String,
    voice_id: String,
}

impl ElevenLabsTtsClient {
    pub fn new(api_key: String, voice_id: String) -> Self {
        Self {
            http: HttpClient::new(),
            api_key,
            voice_id,
        }
    }
}

#[async_trait]
impl TtsClient for ElevenLabsTtsClient {
    async fn synthesize(
        &self,
        text: &str
    ) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> {
        let request_body = ElevenLabsRequest {
            text: text.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        let response = self.http
            .post(format!("https://api.elevenlabs.io/v1/text-to-speech/{}", self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send().await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
