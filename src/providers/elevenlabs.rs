//! ElevenLabs text-to-speech provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{SpeechError, SpeechProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";
const MODEL_ID: &str = "eleven_monolingual_v1";

pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: String,
    voice_id: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

impl ElevenLabsProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        voice_id: String,
        timeout: Duration,
    ) -> Result<Self, SpeechError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let request = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::InvalidResponse(format!("{}: {}", status, body)));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::InvalidResponse("empty audio body".into()));
        }
        Ok(audio.to_vec())
    }
}
