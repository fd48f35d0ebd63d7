//! Handlers for the approval engine: rule administration, evaluation,
//! history and chapter statistics.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::approval::{ApprovalRuleChanges, EvaluationFilter, EvaluationStatus};
use lingo_core::store::ApprovalRuleStore;
use lingo_core::types::DbId;
use lingo_core::usecases::approval_rules::{
    ConfigureApprovalRule, ConfigureRuleInput, GetApprovalRule, SetApprovalRuleActive,
    UpdateApprovalRule,
};
use lingo_core::usecases::evaluate_approval::{EvaluateApproval, EvaluateApprovalInput};
use lingo_core::usecases::evaluation_history::{
    GetChapterEvaluationStats, GetEvaluationHistory, GetLatestEvaluation, HistoryQuery,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::resolve_subject;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /approval/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Learner being evaluated. Defaults to the caller.
    pub user_id: Option<DbId>,
    pub chapter_id: String,
    pub score: f64,
    pub additional_data: Option<serde_json::Value>,
}

/// Query parameters for `GET /approval/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: Option<DbId>,
    pub chapter_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /approval/chapters/{chapter_id}/latest`.
#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub user_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// GET /api/v1/approval/rules
///
/// Active rules, global first.
pub async fn list_rules(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rules = state.store.list_active_rules().await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/approval/rules
///
/// Create or overwrite the rule for a scope (a chapter, or global when
/// `chapter_id` is omitted).
pub async fn configure_rule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ConfigureRuleInput>,
) -> AppResult<impl IntoResponse> {
    let rule = ConfigureApprovalRule::new(state.store.clone())
        .execute(input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/approval/rules/{id}
pub async fn get_rule(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = GetApprovalRule::new(state.store.clone()).execute(id).await?;
    Ok(Json(DataResponse { data: rule }))
}

/// PATCH /api/v1/approval/rules/{id}
pub async fn update_rule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(changes): Json<ApprovalRuleChanges>,
) -> AppResult<impl IntoResponse> {
    let rule = UpdateApprovalRule::new(state.store.clone())
        .execute(id, changes)
        .await?;
    Ok(Json(DataResponse { data: rule }))
}

/// POST /api/v1/approval/rules/{id}/activate
pub async fn activate_rule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = SetApprovalRuleActive::new(state.store.clone())
        .execute(id, true)
        .await?;
    tracing::info!(user_id = admin.user_id, rule_id = id, "Approval rule activated");
    Ok(Json(DataResponse { data: rule }))
}

/// POST /api/v1/approval/rules/{id}/deactivate
pub async fn deactivate_rule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = SetApprovalRuleActive::new(state.store.clone())
        .execute(id, false)
        .await?;
    tracing::info!(user_id = admin.user_id, rule_id = id, "Approval rule deactivated");
    Ok(Json(DataResponse { data: rule }))
}

// ---------------------------------------------------------------------------
// Evaluations
// ---------------------------------------------------------------------------

/// POST /api/v1/approval/evaluate
///
/// Score an attempt against the chapter's rule and store the result.
pub async fn evaluate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<EvaluateRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = resolve_subject(&auth, input.user_id)?;

    let outcome = EvaluateApproval::new(
        state.store.clone(),
        state.store.clone(),
        state.store.clone(),
    )
    .execute(EvaluateApprovalInput {
        user_id,
        chapter_id: input.chapter_id,
        score: input.score,
        additional_data: input.additional_data,
    })
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/approval/history
///
/// Paginated evaluation history, newest first. `has_more` is true when the
/// page came back full.
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = resolve_subject(&auth, params.user_id)?;
    let status = params
        .status
        .as_deref()
        .map(EvaluationStatus::from_str_value)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let query = HistoryQuery {
        filter: EvaluationFilter {
            chapter_id: params.chapter_id,
            status,
        },
        limit: params.limit,
        offset: params.offset,
    };
    let page = GetEvaluationHistory::new(state.store.clone())
        .execute(user_id, query)
        .await?;

    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/approval/chapters/{chapter_id}/stats
///
/// Aggregate results for one chapter across all learners. Staff only.
pub async fn chapter_stats(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let stats = GetChapterEvaluationStats::new(state.store.clone())
        .execute(&chapter_id)
        .await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/approval/chapters/{chapter_id}/latest
///
/// The caller's most recent evaluation for a chapter, or `null`.
pub async fn latest_evaluation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Query(params): Query<LatestParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = resolve_subject(&auth, params.user_id)?;
    let latest = GetLatestEvaluation::new(state.store.clone())
        .execute(user_id, &chapter_id)
        .await?;
    Ok(Json(DataResponse { data: latest }))
}
