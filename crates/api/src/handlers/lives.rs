//! Handlers for the `/lives` resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::error::CoreError;
use lingo_core::lives::DailyLives;
use lingo_core::types::DbId;
use lingo_core::usecases::lives::{ConsumeLife, GetDailyLives, ResetDailyLives};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of `POST /lives/consume`.
///
/// Running out of lives is a normal outcome, not an error: `consumed` is
/// `false` and `lives` shows the exhausted record.
#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub consumed: bool,
    pub lives: DailyLives,
}

/// GET /api/v1/lives
///
/// The caller's lives for today. Creates the record on first use.
pub async fn get_lives(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lives = GetDailyLives::new(state.store.clone())
        .execute(auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: lives }))
}

/// POST /api/v1/lives/consume
pub async fn consume_life(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let consumed = ConsumeLife::new(state.store.clone())
        .execute(auth.user_id)
        .await?;

    let response = match consumed {
        Some(lives) => ConsumeResponse {
            consumed: true,
            lives,
        },
        None => ConsumeResponse {
            consumed: false,
            lives: GetDailyLives::new(state.store.clone())
                .execute(auth.user_id)
                .await?,
        },
    };
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/lives/{user_id}/reset
///
/// Restore a learner's lives to the daily maximum. Admin only.
pub async fn reset_lives(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let lives = ResetDailyLives::new(state.store.clone())
        .execute(user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("DailyLives", user_id)))?;

    tracing::info!(admin_id = admin.user_id, user_id, "Lives reset by admin");

    Ok(Json(DataResponse { data: lives }))
}
