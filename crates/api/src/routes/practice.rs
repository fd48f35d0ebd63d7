//! Route definitions for the `/practices` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::practice;
use crate::state::AppState;

/// Routes mounted at `/practices`.
///
/// ```text
/// POST /                 -> start_practice
/// GET  /                 -> list_practices
/// GET  /{id}             -> get_practice
/// POST /{id}/complete    -> complete_practice
/// POST /{id}/abandon     -> abandon_practice
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(practice::start_practice).get(practice::list_practices),
        )
        .route("/{id}", get(practice::get_practice))
        .route("/{id}/complete", post(practice::complete_practice))
        .route("/{id}/abandon", post(practice::abandon_practice))
}
