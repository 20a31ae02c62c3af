//! Read/write feature area: `/input`.
//!
//! The bootstrap endpoint mirrors `/info`. The secure GET renders the
//! current value inside an editable form along with a fresh token for the
//! subsequent write; the secure POST consumes that token, builds a
//! single-leaf patch from the key path and the submitted text, applies it
//! upstream, and re-renders the form with another fresh token.
//!
//! Secure operations act on a single value: only the first of any
//! comma-separated key paths is used.

use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::{any, get};
use axum::{Extension, Form, Json, RequestExt, Router};
use serde::Deserialize;
use serde_json::Value;

use framegate_core::keypath;
use framegate_session::SessionId;

use crate::error::AppError;
use crate::render;
use crate::routes::missing_key_path;
use crate::state::AppState;

/// Build the `/input` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/secure", any(missing_key_path))
        .route("/secure/", any(missing_key_path))
        .route("/secure/{key_path}", get(secure_read).post(secure_write))
        .route("/{key_path}", get(bootstrap))
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

/// POST body carrying the value to write.
#[derive(Debug, Deserialize)]
struct InputBody {
    #[serde(rename = "input-text")]
    input_text: String,
}

/// Issue a token and render the iframe bootstrap page.
async fn bootstrap(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(key_path): Path<String>,
    Query(query): Query<BootstrapQuery>,
) -> Result<Html<String>, AppError> {
    let token = state.guard.issue(&session).await?;
    tracing::info!(key_path = %key_path, "input embed bootstrapped");

    Ok(Html(render::buffer_page(
        "input",
        &key_path,
        &token,
        query.css.as_deref(),
    )))
}

/// Consume the token, fetch the current value, and render the form with a
/// fresh token for the write.
async fn secure_read(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(key_path): Path<String>,
    Query(query): Query<SecureQuery>,
) -> Result<Html<String>, AppError> {
    state
        .guard
        .validate_and_consume(&session, query.token.as_deref())
        .await?;

    let key_path = first_path(&key_path);
    let document = state.storage.fetch_value(key_path).await?;
    let value = render::value_text(keypath::resolve(&document, key_path)?);

    let fresh = state.guard.issue(&session).await?;
    Ok(Html(render::input_page(
        key_path,
        &value,
        &fresh,
        query.css.as_deref(),
    )))
}

/// Consume the token, apply the submitted value upstream, and re-render
/// the form with another fresh token.
async fn secure_write(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path(key_path): Path<String>,
    Query(query): Query<SecureQuery>,
    req: Request,
) -> Result<Html<String>, AppError> {
    // Consume before reading the body or touching the upstream.
    state
        .guard
        .validate_and_consume(&session, query.token.as_deref())
        .await?;

    let body = extract_input(req).await?;
    let key_path = first_path(&key_path);

    let patch = keypath::build_patch(key_path, Value::String(body.input_text.clone()))?;
    state.storage.patch_value(&patch).await?;
    tracing::info!(key_path = %key_path, "value written upstream");

    let fresh = state.guard.issue(&session).await?;
    Ok(Html(render::input_page(
        key_path,
        &body.input_text,
        &fresh,
        query.css.as_deref(),
    )))
}

/// Secure single-value operations use only the first comma-separated path.
fn first_path(key_paths: &str) -> &str {
    key_paths.split(',').next().unwrap_or(key_paths)
}

/// Read the `input-text` field from a JSON or urlencoded body. Regular
/// form posts and `application/json` (including the merge-patch media
/// types) are both accepted.
async fn extract_input(req: Request) -> Result<InputBody, AppError> {
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));

    if is_json {
        let Json(body) = req
            .extract::<Json<InputBody>, _>()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid input: {e}")))?;
        Ok(body)
    } else {
        let Form(body) = req
            .extract::<Form<InputBody>, _>()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid input: {e}")))?;
        Ok(body)
    }
}
