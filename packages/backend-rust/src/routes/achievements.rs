use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use berean_engine::types::AchievementRule;

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
struct AchievementDto {
    #[serde(flatten)]
    rule: AchievementRule,
    unlocked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AchievementListData {
    achievements: Vec<AchievementDto>,
    unlocked_count: usize,
    total_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckData {
    new_achievements: Vec<AchievementRule>,
    has_new: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_achievements))
        .route("/check", post(check_achievements))
}

async fn list_achievements(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());

    let rules = service
        .achievement_rules()
        .await
        .map_err(map_service_error)?;
    let unlocked = service
        .unlocked_achievements(&user_id)
        .await
        .map_err(map_service_error)?;

    let achievements: Vec<AchievementDto> = rules
        .into_iter()
        .map(|rule| AchievementDto {
            unlocked: unlocked.contains(&rule.id),
            rule,
        })
        .collect();
    let unlocked_count = achievements.iter().filter(|a| a.unlocked).count();

    Ok(Json(SuccessResponse {
        success: true,
        data: AchievementListData {
            unlocked_count,
            total_count: achievements.len(),
            achievements,
        },
    }))
}

async fn check_achievements(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let new_achievements = service
        .check_achievements(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(Json(SuccessResponse {
        success: true,
        data: CheckData {
            has_new: !new_achievements.is_empty(),
            new_achievements,
        },
    }))
}
