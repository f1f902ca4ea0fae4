use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::response::{json_error, AppError};
use crate::routes::{map_service_error, require_user_id};
use crate::services::ProgressService;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_hearts))
        .route("/spend", post(spend_heart))
        .route("/buy", post(buy_heart))
}

async fn get_hearts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let status = service
        .heart_status(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    Ok(Json(SuccessResponse {
        success: true,
        data: status,
    }))
}

async fn spend_heart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let spent = service
        .spend_heart(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    match spent {
        Some(status) => Ok(Json(SuccessResponse {
            success: true,
            data: status,
        })),
        None => Err(json_error(
            StatusCode::CONFLICT,
            "OUT_OF_HEARTS",
            "no hearts available",
        )),
    }
}

async fn buy_heart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user_id = require_user_id(&headers)?;
    let service = ProgressService::new(state.store());
    let bought = service
        .buy_heart(&user_id, Utc::now())
        .await
        .map_err(map_service_error)?;

    match bought {
        Some(status) => Ok(Json(SuccessResponse {
            success: true,
            data: status,
        })),
        None => Err(json_error(
            StatusCode::CONFLICT,
            "PURCHASE_REFUSED",
            "not enough coins or hearts already full",
        )),
    }
}
