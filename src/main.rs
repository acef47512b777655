use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;

use config::Config;
use db::{MemoryMoodLogStore, MoodLogStore, PgMoodLogStore};
use services::flow::{FlowEngine, KeywordFlowEngine, RemoteFlowEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn MoodLogStore>,
    pub flow: Arc<dyn FlowEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mood_journal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let store = build_store(&config).await?;
    let flow = build_flow_engine(&config)?;

    let state = AppState {
        config: config.clone(),
        store,
        flow,
    };

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/chat", post(handlers::chat::chat))
        .route("/logs", get(handlers::logs::list_logs))
        .route("/analytics", get(handlers::analytics::get_analytics))
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn MoodLogStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, mood logs are kept in memory only");
        return Ok(Arc::new(MemoryMoodLogStore::new()));
    };

    let pool = db::create_pool(config, database_url)
        .await
        .context("Failed to create database pool")?;
    let store = PgMoodLogStore::new(pool);
    store
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(store))
}

fn build_flow_engine(config: &Config) -> anyhow::Result<Arc<dyn FlowEngine>> {
    match config.flow_engine_url.as_deref() {
        Some(url) => {
            let timeout = config.flow_engine_timeout_secs.map(Duration::from_secs);
            let engine = RemoteFlowEngine::new(url, timeout)?;
            tracing::info!(
                url = %engine.url(),
                timeout_secs = ?config.flow_engine_timeout_secs,
                "Using remote flow engine"
            );
            Ok(Arc::new(engine))
        }
        None => {
            tracing::info!("Using built-in keyword flow engine");
            let engine = KeywordFlowEngine::new();
            // Evicts idle conversation state every 5 min
            engine.spawn_cleanup_worker();
            Ok(Arc::new(engine))
        }
    }
}
