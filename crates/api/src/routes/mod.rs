pub mod approval;
pub mod auth;
pub mod chapters;
pub mod health;
pub mod lives;
pub mod practice;
pub mod progress;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user, update profile (PATCH)
/// /auth/me/password                                change password (PUT)
///
/// /approval/rules                                  list, configure (admin)
/// /approval/rules/{id}                             get, update (admin)
/// /approval/rules/{id}/activate                    activate (admin)
/// /approval/rules/{id}/deactivate                  deactivate (admin)
/// /approval/evaluate                               evaluate a score (POST)
/// /approval/history                                evaluation history (GET)
/// /approval/chapters/{chapter_id}/stats            chapter statistics (staff)
/// /approval/chapters/{chapter_id}/latest           latest evaluation (GET)
///
/// /chapters                                        chapter status (GET)
/// /chapters/{chapter_id}/complete                  complete a chapter (POST)
///
/// /progress                                        record progress (POST)
/// /progress/{user_id}                              user progress (GET)
/// /progress/{id}                                   update progress (PUT)
///
/// /lives                                           today's lives (GET)
/// /lives/consume                                   spend a life (POST)
/// /lives/{user_id}/reset                           reset (admin)
///
/// /practices                                       start, list
/// /practices/{id}                                  get
/// /practices/{id}/complete                         complete (POST)
/// /practices/{id}/abandon                          abandon (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/approval", approval::router())
        .nest("/chapters", chapters::router())
        .nest("/progress", progress::router())
        .nest("/lives", lives::router())
        .nest("/practices", practice::router())
}
