//! Shared application state.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! handlers via `Arc`: the token handshake guard, the upstream storage
//! client, and the session-cookie signer. All of it is immutable after
//! startup except the guard's session store.

use framegate_core::guard::TokenGuard;

use crate::session::CookieSigner;
use crate::storage::StorageClient;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// One-time token issue/consume.
    pub guard: TokenGuard,
    /// Upstream storage client (mutual TLS).
    pub storage: StorageClient,
    /// Session cookie signing and parsing.
    pub cookies: CookieSigner,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
