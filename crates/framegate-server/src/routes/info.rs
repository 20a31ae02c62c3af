//! Read-only feature area: `/info`.
//!
//! `GET /info/{keyPaths}` issues a one-time token and renders the iframe
//! bootstrap page; `GET /info/secure/{keyPaths}` consumes the token,
//! fetches the user-data document upstream, resolves every
//! comma-separated key path against it, and renders the values.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::{any, get};
use axum::{Extension, Router};
use serde::Deserialize;
use serde_json::Value;

use framegate_core::keypath;
use framegate_session::SessionId;

use crate::error::AppError;
use crate::render;
use crate::routes::missing_key_path;
use crate::state::AppState;

/// Build the `/info` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/secure", any(missing_key_path))
        .route("/secure/", any(missing_key_path))
        .route("/secure/{key_paths}", get(secure_read))
        .route("/{key_paths}", get(bootstrap))
}

#[derive(Debug, Deserialize)]
struct BootstrapQuery {
    css: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecureQuery {
    token: Option<String>,
    css: Option<String>,
}

/// Issue a token and render the iframe bootstrap page.
async fn bootstrap(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(key_paths): Path<String>,
    Query(query): Query<BootstrapQuery>,
) -> Result<Html<String>, AppError> {
    let token = state.guard.issue(&session).await?;
    tracing::info!(key_paths = %key_paths, "info embed bootstrapped");

    Ok(Html(render::buffer_page(
        "info",
        &key_paths,
        &token,
        query.css.as_deref(),
    )))
}

/// Consume the token, fetch the document upstream, and render the value
/// at every comma-separated key path.
async fn secure_read(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(key_paths): Path<String>,
    Query(query): Query<SecureQuery>,
) -> Result<Html<String>, AppError> {
    // Consume before any upstream I/O: a failed fetch must not leave the
    // token replayable.
    state
        .guard
        .validate_and_consume(&session, query.token.as_deref())
        .await?;

    let document = state.storage.fetch_value(&key_paths).await?;

    let mut values: Vec<(&str, &Value)> = Vec::new();
    for path in key_paths.split(',') {
        values.push((path, keypath::resolve(&document, path)?));
    }

    Ok(Html(render::info_page(&values, query.css.as_deref())))
}
