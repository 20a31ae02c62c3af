//! HTTP routes.
//!
//! Two parallel feature areas share the same shape: `/info` is read-only,
//! `/input` is read/write. Each has a non-secure bootstrap endpoint that
//! issues a token and embeds an iframe, and secure endpoints that require
//! the token handshake.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::session::session_middleware;
use crate::state::AppState;

pub mod index;
pub mod info;
pub mod input;

/// Build the application router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(index::router())
        .nest("/info", info::router())
        .nest("/input", input::router())
        .fallback(not_found)
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// JSON 404 for anything outside the routing table, including the bare
/// `secure` segment with a trailing slash.
async fn not_found() -> AppError {
    AppError::NotFound("not found".to_owned())
}

/// Explicit 404 for `/{feature}/secure` with no key path — rejected
/// before any token logic runs.
pub(crate) async fn missing_key_path() -> AppError {
    AppError::NotFound("key path required".to_owned())
}
