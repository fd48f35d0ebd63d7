//! Route definitions for the `/lives` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lives;
use crate::state::AppState;

/// Routes mounted at `/lives`.
///
/// ```text
/// GET  /                  -> get_lives
/// POST /consume           -> consume_life
/// POST /{user_id}/reset   -> reset_lives (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lives::get_lives))
        .route("/consume", post(lives::consume_life))
        .route("/{user_id}/reset", post(lives::reset_lives))
}
