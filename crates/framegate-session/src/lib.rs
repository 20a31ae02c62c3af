//! Session-store abstraction for framegate.
//!
//! This crate defines the [`SessionStore`] trait — a per-client set of
//! one-time handshake tokens, keyed by an opaque [`SessionId`]. The store
//! knows nothing about HTTP, cookies, or how tokens are generated; the
//! server layer owns those concerns.
//!
//! One implementation is provided:
//!
//! - [`MemoryStore`] — in-process map with idle expiry, suitable for a
//!   single-instance deployment and for tests. An external-cache backend
//!   can be added behind the same trait without touching the core.

mod error;
mod memory;

pub use error::SessionError;
pub use memory::MemoryStore;

/// Opaque identifier for one browser client's session.
///
/// The server derives this from a signed cookie; the store treats it as an
/// arbitrary string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier (e.g. one recovered from a cookie).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pluggable per-session token-set store.
///
/// Implementations must be safe to share across async tasks
/// (`Send + Sync`) and must make [`consume_token`](SessionStore::consume_token)
/// atomic: when two requests race to consume the same token, at most one
/// may observe `true`.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Record a token as outstanding for the given session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Backend`] if the underlying store fails.
    async fn add_token(&self, session: &SessionId, token: &str) -> Result<(), SessionError>;

    /// Atomically check for a token and remove it.
    ///
    /// Returns `true` when the token was present and has now been removed,
    /// `false` when the session or token was unknown. The check and the
    /// removal are a single transaction on the store — a consumed token is
    /// never observable again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Backend`] if the underlying store fails.
    async fn consume_token(&self, session: &SessionId, token: &str) -> Result<bool, SessionError>;
}
