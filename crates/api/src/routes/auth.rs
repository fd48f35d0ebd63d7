//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST  /register     -> register
/// POST  /login        -> login
/// GET   /me           -> me (requires auth)
/// PATCH /me           -> update_me (requires auth)
/// PUT   /me/password  -> change_password (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me).patch(auth::update_me))
        .route("/me/password", put(auth::change_password))
}
