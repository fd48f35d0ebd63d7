//! Handlers for the `/progress` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::progress::{NewUserProgress, ProgressChanges};
use lingo_core::types::DbId;
use lingo_core::usecases::progress::{CreateProgress, GetUserProgress, UpdateProgress};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /progress`. Always recorded for the caller.
#[derive(Debug, Deserialize)]
pub struct CreateProgressRequest {
    pub chapter_id: String,
    pub score: Option<f64>,
    pub extra_data: Option<serde_json::Value>,
}

/// POST /api/v1/progress
///
/// Record activity on a chapter. Repeated calls for the same chapter update
/// the existing row.
pub async fn create_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProgressRequest>,
) -> AppResult<impl IntoResponse> {
    let progress = CreateProgress::new(state.store.clone(), state.store.clone())
        .execute(NewUserProgress {
            user_id: auth.user_id,
            chapter_id: input.chapter_id,
            score: input.score,
            extra_data: input.extra_data,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: progress })))
}

/// GET /api/v1/progress/{user_id}
pub async fn get_user_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = GetUserProgress::new(state.store.clone(), state.store.clone())
        .execute(user_id, auth.requester())
        .await?;
    Ok(Json(DataResponse { data: listing }))
}

/// PUT /api/v1/progress/{id}
///
/// Merge `score` and `extra_data` into the caller's own progress row.
pub async fn update_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(changes): Json<ProgressChanges>,
) -> AppResult<impl IntoResponse> {
    let progress = UpdateProgress::new(state.store.clone())
        .execute(id, auth.requester(), changes)
        .await?;

    tracing::info!(user_id = auth.user_id, progress_id = id, "Progress updated");

    Ok(Json(DataResponse { data: progress }))
}
