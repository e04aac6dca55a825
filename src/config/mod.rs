//! Application configuration

pub mod responses;

use std::env;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payments::DEMO_BALANCE;
use crate::providers::DEFAULT_VOICE_ID;
use crate::transactions::DEFAULT_PAGE_SIZE;

pub use responses::load_table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Keep chat history in SQLite under `data_dir`; in memory otherwise
    pub persist_history: bool,
    pub page_size: usize,
    /// Pause before the assistant answers, in milliseconds
    pub typing_delay_ms: u64,
    /// Fixed seed for reply selection; random per process when unset
    pub reply_seed: Option<u64>,
    /// Optional TOML file overriding the built-in replies
    pub responses_path: Option<PathBuf>,
    /// Spendable balance that send requests are checked against
    pub wallet_balance: Decimal,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_url: Option<String>,
    pub voice_id: String,
    pub speech_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            data_dir: env::var("CRYPTOPAY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            persist_history: env::var("CRYPTOPAY_PERSIST_HISTORY")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            page_size: env::var("CRYPTOPAY_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            typing_delay_ms: env::var("CRYPTOPAY_TYPING_DELAY_MS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(0),
            reply_seed: env::var("CRYPTOPAY_REPLY_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
            responses_path: env::var("CRYPTOPAY_RESPONSES").ok().map(PathBuf::from),
            wallet_balance: env::var("CRYPTOPAY_WALLET_BALANCE")
                .ok()
                .and_then(|b| b.trim().parse().ok())
                .unwrap_or(DEMO_BALANCE),
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            elevenlabs_url: env::var("ELEVENLABS_URL").ok(),
            voice_id: env::var("ELEVENLABS_VOICE_ID").unwrap_or_else(|_| DEFAULT_VOICE_ID.into()),
            speech_timeout_secs: env::var("SPEECH_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(15),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("cryptopay.db")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            data_dir: PathBuf::from("./data"),
            persist_history: true,
            page_size: DEFAULT_PAGE_SIZE,
            typing_delay_ms: 0,
            reply_seed: None,
            responses_path: None,
            wallet_balance: DEMO_BALANCE,
            elevenlabs_api_key: None,
            elevenlabs_url: None,
            voice_id: DEFAULT_VOICE_ID.into(),
            speech_timeout_secs: 15,
        }
    }
}
