//! Root route.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(up))
}

/// Liveness probe.
async fn up() -> &'static str {
    "Up and running"
}
