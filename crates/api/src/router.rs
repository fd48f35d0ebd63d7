//! Shared application router builder.
//!
//! The binary (`main.rs`) and the integration tests both go through
//! [`build_app_router`], so they serve the same routes behind the same
//! middleware stack.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Methods the web client uses. Nothing in the API deletes.
const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::PATCH];

/// Build the full application [`Router`].
///
/// Layers run outermost first on the way in:
///
/// 1. CORS, so preflights never reach auth
/// 2. Request id assignment
/// 3. Request/response tracing, tagged with that id
/// 4. Request id echoed on the response
/// 5. Request timeout (408)
/// 6. Panic recovery (500)
/// 7. Body size cap (413), applied to the API routes only
pub fn build_app_router(state: AppState) -> Router {
    let config = state.config.clone();
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = routes::api_routes().layer(DefaultBodyLimit::max(config.max_body_bytes));

    Router::new()
        // Probes hit `/health` without the version prefix.
        .merge(routes::health::router())
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(build_cors_layer(&config, request_id_header))
        .with_state(state)
}

/// CORS for the configured web origins.
///
/// The request id header is exposed so the client can quote it in bug
/// reports. Panics at startup if any configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig, request_id_header: HeaderName) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([request_id_header])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
