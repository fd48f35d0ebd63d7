//! Route definitions for the `/approval` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Routes mounted at `/approval`.
///
/// ```text
/// GET   /rules                          -> list_rules
/// POST  /rules                          -> configure_rule (admin)
/// GET   /rules/{id}                     -> get_rule
/// PATCH /rules/{id}                     -> update_rule (admin)
/// POST  /rules/{id}/activate            -> activate_rule (admin)
/// POST  /rules/{id}/deactivate          -> deactivate_rule (admin)
/// POST  /evaluate                       -> evaluate
/// GET   /history                        -> history
/// GET   /chapters/{chapter_id}/stats    -> chapter_stats (staff)
/// GET   /chapters/{chapter_id}/latest   -> latest_evaluation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(approval::list_rules).post(approval::configure_rule),
        )
        .route(
            "/rules/{id}",
            get(approval::get_rule).patch(approval::update_rule),
        )
        .route("/rules/{id}/activate", post(approval::activate_rule))
        .route("/rules/{id}/deactivate", post(approval::deactivate_rule))
        .route("/evaluate", post(approval::evaluate))
        .route("/history", get(approval::history))
        .route("/chapters/{chapter_id}/stats", get(approval::chapter_stats))
        .route(
            "/chapters/{chapter_id}/latest",
            get(approval::latest_evaluation),
        )
}
