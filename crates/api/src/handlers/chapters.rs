//! Handlers for the `/chapters` resource.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::types::DbId;
use lingo_core::usecases::chapters::{CompleteChapter, GetChaptersStatus};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::resolve_subject;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChaptersParams {
    pub user_id: Option<DbId>,
}

/// GET /api/v1/chapters
///
/// Every course chapter with its unlock, approval and completion state.
pub async fn list_chapters(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ChaptersParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = resolve_subject(&auth, params.user_id)?;
    let overview = GetChaptersStatus::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
    )
    .execute(user_id)
    .await?;
    Ok(Json(DataResponse { data: overview }))
}

/// POST /api/v1/chapters/{chapter_id}/complete
///
/// Complete one of the caller's chapters and open the next.
pub async fn complete_chapter(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let completion = CompleteChapter::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
    )
    .execute(auth.user_id, &chapter_id)
    .await?;
    Ok(Json(DataResponse { data: completion }))
}
