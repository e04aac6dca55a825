//! CryptoPay AI - USDC payment dashboard API
//!
//! Serves the dashboard's transaction history (filter, sort, paginate,
//! select, export) and its scripted payment assistant, with optional
//! read-aloud through a text-to-speech provider.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod payments;
mod providers;
mod routes;
mod transactions;

use config::Config;
use crate::core::{ChatEngine, Dispatcher, InMemoryStore, KeyValueStore, ResponseTable, SqliteStore};
use transactions::{SessionRegistry, Transaction};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat_engine: Arc<ChatEngine>,
    pub ledger: Arc<Vec<Transaction>>,
    pub sessions: Arc<SessionRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptopay_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Assistant replies: built-in unless a response file is configured
    let table = match &config.responses_path {
        Some(path) => {
            let table = config::load_table(path).await?;
            tracing::info!("Loaded assistant replies from {}", path.display());
            table
        }
        None => ResponseTable::builtin(),
    };

    let store: Arc<dyn KeyValueStore> = if config.persist_history {
        Arc::new(SqliteStore::new(&config.database_path()).await?)
    } else {
        tracing::info!("Chat history is kept in memory only");
        Arc::new(InMemoryStore::new())
    };
    let speech = providers::from_config(&config)?;

    let mut chat_engine = ChatEngine::new(Dispatcher::new(table), store)
        .with_speech(speech)
        .with_typing_delay(Duration::from_millis(config.typing_delay_ms));
    if let Some(seed) = config.reply_seed {
        tracing::info!(seed, "Using a fixed seed for assistant replies");
        chat_engine = chat_engine.with_rng(StdRng::seed_from_u64(seed));
    }
    let chat_engine = Arc::new(chat_engine);

    let ledger = Arc::new(transactions::demo_ledger());
    tracing::info!("Loaded {} demo transaction(s)", ledger.len());

    let state = AppState {
        config,
        chat_engine,
        ledger,
        sessions: Arc::new(SessionRegistry::new()),
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("CryptoPay AI API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
