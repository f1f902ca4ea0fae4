//! HTTP-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use berean_backend_rust::create_app_with_store;
use berean_backend_rust::db::memory::MemoryStore;

fn test_app() -> axum::Router {
    create_app_with_store(Arc::new(MemoryStore::with_defaults()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_ok() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/nonexistent/path")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_user_id_is_unauthorized() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_fresh_profile_defaults() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["level"], 1);
    assert_eq!(body["data"]["xp"], 0);
    assert_eq!(body["data"]["coins"], 0);
    assert_eq!(body["data"]["hearts"]["count"], 5);
    assert_eq!(body["data"]["xpForNextLevel"], 100);
}

#[tokio::test]
async fn test_complete_lesson_end_to_end() {
    let app = test_app();

    let payload = json!({
        "totalPoints": 150,
        "correctAnswers": 5,
        "maxCombo": 5,
        "questionCount": 5
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/lessons/lesson-gospels-1/complete")
                .header("x-user-id", "guest-1")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["passed"], true);
    assert_eq!(body["data"]["scorePercent"], 100);
    assert_eq!(body["data"]["xpEarned"], 75);
    assert_eq!(body["data"]["coinsEarned"], 28);
    assert_eq!(body["data"]["perfect"], true);
    assert_eq!(body["data"]["newAchievements"].as_array().unwrap().len(), 2);

    // Profile reflects settlement plus achievement coin rewards.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["xp"], 75);
    assert_eq!(body["data"]["coins"], 63);
    assert_eq!(body["data"]["lessonsCompleted"], 1);
    assert_eq!(body["data"]["currentStreak"], 1);
}

#[tokio::test]
async fn test_complete_unknown_content_is_404() {
    let payload = json!({
        "totalPoints": 0,
        "correctAnswers": 0,
        "maxCombo": 0,
        "questionCount": 5
    });
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/lessons/no-such-lesson/complete")
                .header("x-user-id", "guest-1")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_buy_heart_refused_for_fresh_user() {
    // Full pool and zero coins: either reason alone refuses.
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/hearts/buy")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "PURCHASE_REFUSED");
}

#[tokio::test]
async fn test_spend_hearts_until_conflict() {
    let app = test_app();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/hearts/spend")
                    .header("x-user-id", "guest-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/hearts/spend")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "OUT_OF_HEARTS");
}

#[tokio::test]
async fn test_achievement_listing_marks_unlocks() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/achievements")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalCount"], 8);
    assert_eq!(body["data"]["unlockedCount"], 0);

    let payload = json!({
        "totalPoints": 150,
        "correctAnswers": 5,
        "maxCombo": 5,
        "questionCount": 5
    });
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/lessons/lesson-gospels-1/complete")
                .header("x-user-id", "guest-1")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/achievements")
                .header("x-user-id", "guest-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["unlockedCount"], 2);
}

#[tokio::test]
async fn test_checkin_is_idempotent_within_a_day() {
    let app = test_app();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/streak/checkin")
                    .header("x-user-id", "guest-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["currentStreak"], 1);
    }
}
