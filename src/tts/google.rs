use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::TtsClient;

const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech over its REST surface. The response
/// carries the MP3 payload base64-encoded in `audioContent`.
pub struct GoogleTtsClient {
    http: HttpClient,
    api_key: String,
    voice_name: String,
    language_code: String,
}

impl GoogleTtsClient {
    pub fn new(api_key: String, voice_name: String, language_code: String) -> Self {
        Self {
            http: HttpClient::new(),
            api_key,
            voice_name,
            language_code,
        }
    }
}

#[async_trait]
impl TtsClient for GoogleTtsClient {
    async fn synthesize(
        &self,
        text: &str
    ) -> Result<Vec<u8>, Box<dyn StdError + Send + Sync>> {
        let req = SynthesizeRequest {
            input: SynthesisInput { text: text.to_string() },
            voice: VoiceSelection {
                language_code: self.language_code.clone(),
                name: self.voice_name.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };

        let url = format!("{}?key={}", SYNTHESIZE_URL, self.api_key);
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<SynthesizeResponse>().await?;

        let audio = BASE64.decode(data.audio_content.as_bytes()).map_err(|e|
            format!("invalid base64 audio content: {}", e)
        )?;
        Ok(audio)
    }
}
