//! Session-store error types.

/// Errors that can occur during session-store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying backend failed.
    #[error("session backend failure for session '{session}': {reason}")]
    Backend { session: String, reason: String },
}
