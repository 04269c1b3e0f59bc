pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use drill_core::{make_key, snapshot, PracticeSession, ProgressBackend, ProgressStore};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::Config;
use crate::services::saver::SaveQueue;
use crate::services::storage::FileStorage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<HashMap<Uuid, PracticeSession>>>,
    pub store: Arc<ProgressStore<Arc<dyn ProgressBackend>>>,
    pub saver: SaveQueue,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state and start the save worker. Must run inside a tokio runtime.
    pub fn new(config: Config, backend: Arc<dyn ProgressBackend>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            saver: SaveQueue::spawn(Arc::clone(&backend)),
            store: Arc::new(ProgressStore::new(backend)),
            config: Arc::new(config),
        }
    }

    /// Queue a session's snapshot under `{id}/progress_data`.
    ///
    /// Returns `false` when the snapshot could not be queued or when the last
    /// completed write for this session failed. The in-memory session is
    /// never rolled back.
    pub fn persist(&self, id: Uuid, session: &PracticeSession) -> bool {
        let bytes = match snapshot::serialize(session) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not serialize session {}: {}", id, e);
                return false;
            }
        };

        let queued = self.saver.enqueue(make_key(&id.to_string()), bytes);
        if !queued {
            tracing::warn!("Save queue unavailable, session {} not persisted", id);
            return false;
        }
        self.save_error(id).is_none()
    }

    /// Why the last completed write for a session failed, if it did.
    pub fn save_error(&self, id: Uuid) -> Option<String> {
        self.saver.last_failure(&make_key(&id.to_string()))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/sessions", post(routes::sessions::create))
        .route("/api/sessions/import", post(routes::sessions::import))
        .route(
            "/api/sessions/:id",
            get(routes::sessions::show).delete(routes::sessions::close),
        )
        .route("/api/sessions/:id/restore", post(routes::sessions::restore))
        .route("/api/sessions/:id/snapshot", get(routes::sessions::download))
        .route("/api/sessions/:id/mistakes", get(routes::sessions::mistakes))
        .route("/api/sessions/:id/settings", put(routes::settings::update));

    let practice_routes = Router::new()
        .route("/api/sessions/:id/:mode/:direction/begin", post(routes::practice::begin))
        .route("/api/sessions/:id/:mode/:direction/current", get(routes::practice::current))
        .route("/api/sessions/:id/:mode/:direction/answer", post(routes::practice::answer))
        .route(
            "/api/sessions/:id/:mode/:direction/assessment",
            post(routes::practice::change_assessment),
        )
        .route("/api/sessions/:id/:mode/:direction/question", delete(routes::practice::drop_question))
        .route("/api/sessions/:id/:mode/:direction/reset", post(routes::practice::reset))
        .route("/api/sessions/:id/:mode/:direction/attempts", get(routes::practice::attempts));

    Router::new()
        .route("/health", get(health_check))
        .merge(session_routes)
        .merge(practice_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Using data directory {}", config.data_dir.display());
    let storage = FileStorage::new(&config.data_dir)?;

    let addr = config.addr();
    let state = AppState::new(config, Arc::new(storage));
    let app = build_router(state.clone());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flushing pending saves...");
    state.saver.flush().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health_check() -> &'static str {
    "OK"
}
