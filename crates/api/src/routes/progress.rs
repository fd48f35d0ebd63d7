//! Route definitions for the `/progress` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`.
///
/// `GET` reads the path segment as a user id, `PUT` as a progress row id.
///
/// ```text
/// POST /          -> create_progress
/// GET  /{id}      -> get_user_progress
/// PUT  /{id}      -> update_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(progress::create_progress)).route(
        "/{id}",
        get(progress::get_user_progress).put(progress::update_progress),
    )
}
