//! Token handshake guard.
//!
//! The central security primitive: every secure endpoint is gated on a
//! one-time token issued at the bootstrap endpoint and bound to the
//! caller's session. A token is valid for at most one successful
//! validation; consumption happens before any downstream I/O runs, so a
//! failed upstream call never leaves a token replayable.

use std::sync::Arc;

use framegate_session::{SessionId, SessionStore};

use crate::error::GuardError;
use crate::token;

/// Issues and consumes session-bound one-time tokens.
#[derive(Clone)]
pub struct TokenGuard {
    store: Arc<dyn SessionStore>,
}

impl TokenGuard {
    /// Create a guard over the given session store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Issue a fresh token for the session and record it as outstanding.
    ///
    /// Tokens carry no expiry of their own — they die by consumption or by
    /// the session's idle expiry.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Store`] if the session store fails.
    pub async fn issue(&self, session: &SessionId) -> Result<String, GuardError> {
        let token = token::generate();
        self.store.add_token(session, &token).await?;
        tracing::debug!(session = %session, "handshake token issued");
        Ok(token)
    }

    /// Validate a presented token and consume it.
    ///
    /// Rejects when the token is absent, empty, or not outstanding for this
    /// session. The check-and-remove is a single atomic operation on the
    /// store: of two requests racing on the same token, at most one
    /// succeeds.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Rejected`] for a missing or invalid token.
    /// - [`GuardError::Store`] if the session store fails.
    pub async fn validate_and_consume(
        &self,
        session: &SessionId,
        presented: Option<&str>,
    ) -> Result<(), GuardError> {
        let Some(presented) = presented.filter(|t| !t.is_empty()) else {
            return Err(GuardError::Rejected);
        };

        if self.store.consume_token(session, presented).await? {
            Ok(())
        } else {
            tracing::warn!(session = %session, "handshake token rejected");
            Err(GuardError::Rejected)
        }
    }
}

impl std::fmt::Debug for TokenGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use framegate_session::MemoryStore;

    fn make_guard() -> TokenGuard {
        TokenGuard::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn issued_token_validates_once() {
        let guard = make_guard();
        let session = SessionId::generate();
        let token = guard.issue(&session).await.unwrap();

        guard
            .validate_and_consume(&session, Some(&token))
            .await
            .unwrap();
        let replay = guard.validate_and_consume(&session, Some(&token)).await;
        assert!(matches!(replay, Err(GuardError::Rejected)));
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let guard = make_guard();
        let session = SessionId::generate();

        let result = guard.validate_and_consume(&session, None).await;
        assert!(matches!(result, Err(GuardError::Rejected)));

        let result = guard.validate_and_consume(&session, Some("")).await;
        assert!(matches!(result, Err(GuardError::Rejected)));
    }

    #[tokio::test]
    async fn never_issued_token_is_rejected() {
        let guard = make_guard();
        let session = SessionId::generate();

        let result = guard
            .validate_and_consume(&session, Some("deadbeef"))
            .await;
        assert!(matches!(result, Err(GuardError::Rejected)));
    }

    #[tokio::test]
    async fn token_is_bound_to_its_session() {
        let guard = make_guard();
        let alice = SessionId::generate();
        let bob = SessionId::generate();
        let token = guard.issue(&alice).await.unwrap();

        let result = guard.validate_and_consume(&bob, Some(&token)).await;
        assert!(matches!(result, Err(GuardError::Rejected)));

        // Still consumable by the session it was issued to.
        guard
            .validate_and_consume(&alice, Some(&token))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_embeds_hold_independent_tokens() {
        let guard = make_guard();
        let session = SessionId::generate();
        let first = guard.issue(&session).await.unwrap();
        let second = guard.issue(&session).await.unwrap();
        assert_ne!(first, second);

        guard
            .validate_and_consume(&session, Some(&first))
            .await
            .unwrap();
        guard
            .validate_and_consume(&session, Some(&second))
            .await
            .unwrap();
    }
}
