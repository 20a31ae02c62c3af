//! Error types for `framegate-core`.
//!
//! Each variant carries enough context to diagnose the problem without a
//! debugger. Token values never appear in error messages.

use framegate_session::SessionError;

/// Errors from key-path resolution and patch construction.
#[derive(Debug, thiserror::Error)]
pub enum KeyPathError {
    /// The key path contained no segments after dropping a trailing dot.
    #[error("empty key path")]
    Empty,

    /// A segment did not resolve to a field of the document.
    #[error("key path '{path}' not found: no field '{segment}'")]
    NotFound { path: String, segment: String },
}

/// Errors from the token handshake guard.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The presented token was missing, malformed, or not outstanding for
    /// this session.
    #[error("Rejected")]
    Rejected,

    /// The session store failed.
    #[error("guard session store error: {0}")]
    Store(#[from] SessionError),
}
