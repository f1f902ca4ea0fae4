pub mod achievements;
pub mod health;
pub mod hearts;
pub mod lessons;
pub mod profile;

use axum::http::HeaderMap;
use axum::Router;

use crate::response::AppError;
use crate::services::ServiceError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/hearts", hearts::router())
        .nest("/api/lessons", lessons::router())
        .nest("/api/challenges", lessons::challenges_router())
        .nest("/api/achievements", achievements::router())
        .nest("/api/profile", profile::router())
        .nest("/api/streak", profile::streak_router())
        .fallback(fallback)
        .with_state(state)
}

async fn fallback() -> AppError {
    AppError::not_found("route not found")
}

/// Caller identity comes from the `X-User-Id` header. Guest clients
/// send a locally generated id and stay on the in-memory store; the
/// scoring path is identical either way.
pub(crate) fn require_user_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized("missing X-User-Id header"))
}

pub(crate) fn map_service_error(err: ServiceError) -> AppError {
    match err {
        ServiceError::Store(crate::db::StoreError::ContentNotFound(id)) => {
            AppError::not_found(format!("content not found: {id}"))
        }
        ServiceError::Engine(engine) => AppError::validation(engine.to_string()),
        ServiceError::WrongKind { .. } => AppError::bad_request(err.to_string()),
        ServiceError::Store(store) => {
            tracing::error!(error = %store, "store failure");
            AppError::internal(store.to_string())
        }
    }
}
