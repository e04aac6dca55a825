//! Chat engine for the payment assistant
//!
//! The ChatEngine wraps the stateless [`Dispatcher`] with everything the
//! chat view needs around it:
//! 1. Rejects blank input
//! 2. Waits the configured "typing" delay
//! 3. Dispatches
//! 4. Appends both messages to the history stored under [`HISTORY_KEY`]
//! 5. Optionally reads the reply aloud through a speech provider

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::conversation::{Conversation, Message};
use crate::providers::SpeechProvider;

use super::dispatcher::Dispatcher;
use super::memory::{KeyValueStore, MemoryError};

/// Storage key of the chat log
pub const HISTORY_KEY: &str = "assistant-messages";

/// Request to the chat engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,

    /// Read the reply aloud
    #[serde(default)]
    pub speak: bool,
}

/// What happened to the read-aloud request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SpeechOutcome {
    /// Not requested
    Skipped,
    /// Requested, but no speech provider is configured
    Unavailable,
    #[serde(rename_all = "camelCase")]
    Spoken { audio_base64: String },
    Failed { reason: String },
}

/// Response from the chat engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: Message,
    pub speech: SpeechOutcome,
}

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct ChatEngine {
    dispatcher: Dispatcher,
    store: Arc<dyn KeyValueStore>,
    speech: Option<Arc<dyn SpeechProvider>>,
    rng: Mutex<StdRng>,
    typing_delay: Duration,
    /// Serializes load-append-save of the history
    history_lock: Mutex<()>,
}

impl ChatEngine {
    pub fn new(dispatcher: Dispatcher, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            dispatcher,
            store,
            speech: None,
            rng: Mutex::new(StdRng::from_entropy()),
            typing_delay: Duration::ZERO,
            history_lock: Mutex::new(()),
        }
    }

    pub fn with_speech(mut self, provider: Option<Arc<dyn SpeechProvider>>) -> Self {
        self.speech = provider;
        self
    }

    /// Replace the random source, e.g. with a seeded one
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Answer one message and record both sides of the exchange
    pub async fn send(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let text = request.message.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user_message = Message::user(text);
        if !self.typing_delay.is_zero() {
            tokio::time::sleep(self.typing_delay).await;
        }

        let reply = {
            let mut rng = self.rng.lock().await;
            self.dispatcher.dispatch(text, &mut *rng)
        };
        let message = Message::assistant(&reply.text, reply.category);

        {
            let _guard = self.history_lock.lock().await;
            let mut history = self.history().await?;
            if history.is_empty() {
                tracing::debug!("Starting a new conversation");
            }
            history.push(user_message);
            history.push(message.clone());

            self.store.set(HISTORY_KEY, &history.to_json()?).await?;
            tracing::debug!(messages = history.len(), "Saved chat history");
        }

        let speech = if request.speak {
            self.speak(&message.content).await
        } else {
            SpeechOutcome::Skipped
        };

        Ok(ChatReply { message, speech })
    }

    /// Stored history. A corrupt record reads as an empty history.
    pub async fn history(&self) -> Result<Conversation, ChatError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Conversation::new());
        };

        match Conversation::from_json(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                tracing::error!("Failed to load conversation history: {}", e);
                Ok(Conversation::new())
            }
        }
    }

    pub async fn clear(&self) -> Result<(), ChatError> {
        let _guard = self.history_lock.lock().await;
        self.store.delete(HISTORY_KEY).await?;
        tracing::info!("Cleared chat history");
        Ok(())
    }

    async fn speak(&self, text: &str) -> SpeechOutcome {
        let Some(provider) = &self.speech else {
            return SpeechOutcome::Unavailable;
        };

        match provider.synthesize(text).await {
            Ok(audio) => SpeechOutcome::Spoken {
                audio_base64: STANDARD.encode(audio),
            },
            Err(e) => {
                tracing::warn!(provider = provider.name(), "Text-to-speech failed: {}", e);
                SpeechOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
