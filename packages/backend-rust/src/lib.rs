pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::memory::MemoryStore;
use crate::db::sqlite::SqliteStore;
use crate::db::ProgressStore;
use crate::state::AppState;

/// Build the app with the store chosen from the environment: sqlite
/// when `BEREAN_DB_PATH` is set, the in-memory store otherwise. A
/// sqlite connection failure falls back to memory so the service still
/// comes up for guest play.
pub async fn create_app() -> axum::Router {
    let config = config::Config::from_env();
    let store: Arc<dyn ProgressStore> = match config.database_path {
        Some(path) => {
            let url = format!("sqlite:{path}?mode=rwc");
            match SqliteStore::connect(&url).await {
                Ok(store) => Arc::new(store),
                Err(err) => {
                    tracing::warn!(error = %err, "sqlite store unavailable, using memory store");
                    Arc::new(MemoryStore::with_defaults())
                }
            }
        }
        None => Arc::new(MemoryStore::with_defaults()),
    };

    create_app_with_store(store)
}

pub fn create_app_with_store(store: Arc<dyn ProgressStore>) -> axum::Router {
    let state = AppState::new(store);
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
