//! HTTP-level tests for daily lives and practice sessions.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth};
use lingo_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use sqlx::PgPool;

fn start_body(practice_type: &str) -> serde_json::Value {
    serde_json::json!({ "practice_type": practice_type, "chapter_id": "1" })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_read_creates_full_lives(pool: PgPool) {
    let (student, token) =
        common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/lives", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], student.id);
    assert_eq!(json["data"]["current_lives"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn consuming_stops_at_zero_without_error(pool: PgPool) {
    let (_s, token) = common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    for expected in (0..5).rev() {
        let json = body_json(post_auth(app.clone(), "/api/v1/lives/consume", &token).await).await;
        assert_eq!(json["data"]["consumed"], true);
        assert_eq!(json["data"]["lives"]["current_lives"], expected);
    }

    let response = post_auth(app, "/api/v1/lives/consume", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["consumed"], false);
    assert_eq!(json["data"]["lives"]["current_lives"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_reset_refills_lives(pool: PgPool) {
    let (_admin, admin_token) = common::user_with_token(&pool, "admin@example.com", ROLE_ADMIN).await;
    let (student, token) =
        common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    post_auth(app.clone(), "/api/v1/lives/consume", &token).await;
    post_auth(app.clone(), "/api/v1/lives/consume", &token).await;

    let uri = format!("/api/v1/lives/{}/reset", student.id);
    let response = post_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app.clone(), &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["current_lives"], 5);

    let response = post_auth(app, "/api/v1/lives/999999/reset", &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_practice_costs_a_life(pool: PgPool) {
    let (_s, token) = common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app.clone(), "/api/v1/practices", start_body("quiz"), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["lives_remaining"], 4);
    assert_eq!(json["data"]["session"]["status"], "started");
    assert_eq!(json["data"]["session"]["practice_type"], "quiz");

    let lives = body_json(get_auth(app, "/api/v1/lives", &token).await).await;
    assert_eq!(lives["data"]["current_lives"], 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_practice_without_lives_returns_409(pool: PgPool) {
    let (_s, token) = common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response =
            post_json_auth(app.clone(), "/api/v1/practices", start_body("reading"), &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response =
        post_json_auth(app.clone(), "/api/v1/practices", start_body("reading"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let list = body_json(get_auth(app, "/api/v1/practices", &token).await).await;
    assert_eq!(list["data"]["total"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn practice_lifecycle_and_ownership(pool: PgPool) {
    let (_s, token) = common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let (_o, other_token) = common::user_with_token(&pool, "other@example.com", ROLE_STUDENT).await;
    let (_a, admin_token) = common::user_with_token(&pool, "admin@example.com", ROLE_ADMIN).await;
    let app = common::build_test_app(pool);

    let started = body_json(
        post_json_auth(app.clone(), "/api/v1/practices", start_body("interview"), &token).await,
    )
    .await;
    let id = started["data"]["session"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/practices/{id}");

    let response = get_auth(app.clone(), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get_auth(app.clone(), &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app.clone(),
        &format!("{uri}/complete"),
        serde_json::json!({ "score": 150.0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &format!("{uri}/complete"),
        serde_json::json!({ "score": 88.0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let done = body_json(response).await;
    assert_eq!(done["data"]["status"], "completed");
    assert_eq!(done["data"]["score"], 88.0);
    assert!(done["data"]["completed_at"].is_string());

    let response = post_auth(app, &format!("{uri}/abandon"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_type(pool: PgPool) {
    let (_s, token) = common::user_with_token(&pool, "student@example.com", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    for practice_type in ["quiz", "vocabulary", "quiz"] {
        post_json_auth(app.clone(), "/api/v1/practices", start_body(practice_type), &token).await;
    }

    let quizzes = body_json(
        get_auth(app.clone(), "/api/v1/practices?practice_type=quiz&limit=1", &token).await,
    )
    .await;
    assert_eq!(quizzes["data"]["total"], 2);
    assert_eq!(quizzes["data"]["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(quizzes["data"]["limit"], 1);

    let response = get_auth(app, "/api/v1/practices?practice_type=karaoke", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
