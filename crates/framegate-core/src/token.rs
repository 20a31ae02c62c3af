//! One-time token generation.

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate an opaque one-time token.
///
/// SHA-256 over the current UTC timestamp (second precision) concatenated
/// with a freshly generated random UUID v4, rendered as 64 lowercase hex
/// characters. The UUID's 122 random bits make collisions negligible; the
/// timestamp ties the digest to issuance time.
#[must_use]
pub fn generate() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}
