//! Route definitions for the `/chapters` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chapters;
use crate::state::AppState;

/// Routes mounted at `/chapters`.
///
/// ```text
/// GET  /                         -> list_chapters
/// POST /{chapter_id}/complete    -> complete_chapter
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chapters::list_chapters))
        .route("/{chapter_id}/complete", post(chapters::complete_chapter))
}
