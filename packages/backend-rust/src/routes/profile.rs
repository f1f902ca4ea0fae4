use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use berean_engine::xp;

use crate::response::AppError;
use crate::routes::{map_service_error, require_user_id};
use crate::services::ProgressService;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileData {
    #[serde(flatten)]
    profile: crate::db::UserProfile,
    xp_for_next_level: u64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile))
}

pub fn streak_router() -> Router<AppState> {
    Router::new().route("/checkin", post(daily_checkin))
}

async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let profile = service
        .profile(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    let xp_for_next_level = xp::xp_for_level(profile.experience.level + 1);
    Ok(Json(SuccessResponse {
        success: true,
        data: ProfileData {
            profile,
            xp_for_next_level,
        },
    }))
}

async fn daily_checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let streak = service
        .daily_checkin(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(Json(SuccessResponse {
        success: true,
        data: streak,
    }))
}
