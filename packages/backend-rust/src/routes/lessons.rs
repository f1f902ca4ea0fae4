use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use berean_engine::types::QuizTally;

use crate::response::AppError;
use crate::routes::{map_service_error, require_user_id};
use crate::services::ProgressService;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

/// Client-submitted final tally of an attempt. The server never replays
/// the per-question timeline; it validates consistency at settlement.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    total_points: u32,
    correct_answers: u32,
    max_combo: u32,
    question_count: u32,
}

impl CompleteRequest {
    fn tally(&self) -> QuizTally {
        QuizTally {
            total_points: self.total_points,
            correct_answers: self.correct_answers,
            max_combo: self.max_combo,
            question_count: self.question_count,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:id/complete", post(complete_lesson))
}

pub fn challenges_router() -> Router<AppState> {
    Router::new().route("/:id/complete", post(complete_challenge))
}

async fn complete_lesson(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let summary = service
        .complete_lesson(&user_id, &id, request.tally(), Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(Json(SuccessResponse {
        success: true,
        data: summary,
    }))
}

async fn complete_challenge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let summary = service
        .complete_challenge(&user_id, &id, request.tally(), Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(Json(SuccessResponse {
        success: true,
        data: summary,
    }))
}
