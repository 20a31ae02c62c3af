//! Session cookie handling.
//!
//! Each browser client is identified by an opaque session id carried in a
//! signed cookie. The cookie value is `{id}.{sig}` where `sig` is the
//! lowercase-hex HMAC-SHA256 of the id under the configured secret; a bad
//! or missing signature is treated the same as no cookie. The id itself
//! is random and carries no meaning — all per-client state lives in the
//! session store.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use framegate_session::SessionId;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "framegate.sid";

/// Signs and verifies session cookies.
pub struct CookieSigner {
    secret: Vec<u8>,
}

impl CookieSigner {
    /// Create a signer over the given secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Recover a verified session id from a `Cookie` request header.
    #[must_use]
    pub fn session_from_header(&self, header: &str) -> Option<SessionId> {
        let value = header
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))?;

        let (id, sig) = value.rsplit_once('.')?;
        if self.verify(id, sig) {
            Some(SessionId::new(id))
        } else {
            None
        }
    }

    /// Build the `Set-Cookie` value for a session.
    #[must_use]
    pub fn set_cookie(&self, session: &SessionId) -> Option<String> {
        let sig = self.sign(session.as_str())?;
        Some(format!(
            "{SESSION_COOKIE}={}.{sig}; Path=/; HttpOnly",
            session.as_str()
        ))
    }

    fn sign(&self, id: &str) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(id.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    fn verify(&self, id: &str, sig: &str) -> bool {
        let Some(expected) = self.sign(id) else {
            return false;
        };
        expected.as_bytes().ct_eq(sig.as_bytes()).into()
    }
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

/// Attach a [`SessionId`] to every request.
///
/// An existing, correctly signed cookie is reused; otherwise a fresh
/// session id is generated and set on the response. Handlers read the id
/// from request extensions.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = req
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| state.cookies.session_from_header(header));

    let (session, fresh) = match existing {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if fresh {
        if let Some(cookie) = state.cookies.set_cookie(&session) {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cookie_round_trips() {
        let signer = CookieSigner::new(b"secret");
        let session = SessionId::generate();
        let cookie = signer.set_cookie(&session).unwrap();

        let header = cookie.split(';').next().unwrap();
        let recovered = signer.session_from_header(header).unwrap();
        assert_eq!(recovered, session);
    }

    #[test]
    fn tampered_signature_is_ignored() {
        let signer = CookieSigner::new(b"secret");
        assert!(signer
            .session_from_header(&format!("{SESSION_COOKIE}=abc123.deadbeef"))
            .is_none());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let signer = CookieSigner::new(b"secret");
        let other = CookieSigner::new(b"other");
        let session = SessionId::generate();
        let cookie = other.set_cookie(&session).unwrap();
        let header = cookie.split(';').next().unwrap();
        assert!(signer.session_from_header(header).is_none());
    }

    #[test]
    fn unrelated_cookies_are_skipped() {
        let signer = CookieSigner::new(b"secret");
        let session = SessionId::new("abc");
        let sig = signer.sign("abc").unwrap();
        let header = format!("theme=dark; {SESSION_COOKIE}=abc.{sig}; lang=en");
        assert_eq!(signer.session_from_header(&header).unwrap(), session);
    }

    #[test]
    fn missing_cookie_yields_none() {
        let signer = CookieSigner::new(b"secret");
        assert!(signer.session_from_header("theme=dark").is_none());
        assert!(signer.session_from_header("").is_none());
    }
}
