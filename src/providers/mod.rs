//! Text-to-speech integrations
//!
//! Speech is a side effect of the chat: a failed synthesis is reported to
//! the caller and never retried here.

mod elevenlabs;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub use elevenlabs::{ElevenLabsProvider, DEFAULT_BASE_URL, DEFAULT_VOICE_ID};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Turns reply text into audio
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Encoded audio (MP3 for ElevenLabs)
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Build the configured provider, or `None` when no API key is set
pub fn from_config(config: &Config) -> Result<Option<Arc<dyn SpeechProvider>>, SpeechError> {
    let Some(api_key) = config.elevenlabs_api_key.clone() else {
        tracing::info!("ELEVENLABS_API_KEY not set, read-aloud disabled");
        return Ok(None);
    };

    let provider = ElevenLabsProvider::new(
        config
            .elevenlabs_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        api_key,
        config.voice_id.clone(),
        Duration::from_secs(config.speech_timeout_secs),
    )?;

    Ok(Some(Arc::new(provider)))
}
