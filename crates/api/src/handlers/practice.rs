//! Handlers for the `/practices` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::practice::{NewPracticeSession, PracticeType};
use lingo_core::types::DbId;
use lingo_core::usecases::practice::{
    AbandonPracticeSession, CompletePracticeSession, GetPracticeSession, ListPracticeSessions,
    StartPracticeSession,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /practices`.
#[derive(Debug, Deserialize)]
pub struct StartPracticeRequest {
    pub practice_type: PracticeType,
    pub chapter_id: Option<String>,
}

/// Request body for `POST /practices/{id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompletePracticeRequest {
    pub score: f64,
}

/// Query parameters for `GET /practices`.
#[derive(Debug, Deserialize)]
pub struct ListPracticeParams {
    pub practice_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/practices
///
/// Start a session. Costs one daily life; 409 when none remain.
pub async fn start_practice(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartPracticeRequest>,
) -> AppResult<impl IntoResponse> {
    let started = StartPracticeSession::new(state.store.clone(), state.store.clone())
        .execute(NewPracticeSession {
            user_id: auth.user_id,
            chapter_id: input.chapter_id,
            practice_type: input.practice_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// GET /api/v1/practices
pub async fn list_practices(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPracticeParams>,
) -> AppResult<impl IntoResponse> {
    let practice_type = params
        .practice_type
        .as_deref()
        .map(PracticeType::from_str_value)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let page = ListPracticeSessions::new(state.store.clone())
        .execute(auth.user_id, practice_type, params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/practices/{id}
pub async fn get_practice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = GetPracticeSession::new(state.store.clone())
        .execute(id, auth.requester())
        .await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/practices/{id}/complete
pub async fn complete_practice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompletePracticeRequest>,
) -> AppResult<impl IntoResponse> {
    let session = CompletePracticeSession::new(state.store.clone())
        .execute(id, auth.requester(), input.score)
        .await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/practices/{id}/abandon
pub async fn abandon_practice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = AbandonPracticeSession::new(state.store.clone())
        .execute(id, auth.requester())
        .await?;
    Ok(Json(DataResponse { data: session }))
}
