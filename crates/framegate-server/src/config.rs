//! Server configuration for framegate.
//!
//! Loads configuration from environment variables once at startup. TLS
//! material is referenced by file path and read when the listener and the
//! upstream client are built — nothing here touches the filesystem.

use std::path::PathBuf;

/// Default listen port when `PORT` is unset or invalid.
const DEFAULT_PORT: u16 = 3000;

/// Default session idle expiry in seconds.
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// The server TLS identity is incomplete.
    #[error("missing TLS info: set SERVER_KEY, SERVER_CERT, and SERVER_CA_CHAIN")]
    MissingTls,
}

/// Deployment zone. Anything unrecognized falls back to `Prod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Dev,
    Staging,
    Prod,
    Test,
}

impl Zone {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("dev") => Self::Dev,
            Some("staging") => Self::Staging,
            Some("test") => Self::Test,
            _ => Self::Prod,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
            Self::Test => "test",
        };
        f.write_str(name)
    }
}

/// A TLS key/cert/CA-chain triple, referenced by file path.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    /// PEM private key.
    pub key: PathBuf,
    /// PEM certificate.
    pub cert: PathBuf,
    /// PEM chain of CA certificates back to the root.
    pub ca_chain: PathBuf,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment zone (logging only).
    pub zone: Zone,
    /// Port to listen on.
    pub port: u16,
    /// Server TLS identity, required to serve HTTPS.
    pub server_tls: TlsPaths,
    /// Upstream client TLS identity; when absent the upstream client
    /// presents no certificate.
    pub client_tls: Option<TlsPaths>,
    /// Upstream storage base URL, normalized to no trailing slash.
    pub storage_url: String,
    /// Secret used to sign the session cookie.
    pub session_secret: String,
    /// Log level filter (e.g. `info`, `debug`).
    pub log_level: String,
    /// Session idle expiry in seconds.
    pub session_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ZONE` — `dev`, `staging`, `prod`, or `test` (default: `prod`)
    /// - `PORT` — listen port in 1..=65535 (default: `3000`)
    /// - `SERVER_KEY` / `SERVER_CERT` / `SERVER_CA_CHAIN` — server TLS
    ///   identity file paths (all required)
    /// - `CLIENT_KEY` / `CLIENT_CERT` / `CLIENT_CA_CHAIN` — upstream client
    ///   TLS identity file paths (optional as a triple)
    /// - `STORAGE_URL` — upstream storage base URL (required)
    /// - `SESSION_SECRET` — session cookie signing secret (required)
    /// - `FRAMEGATE_LOG_LEVEL` — log filter (default: `info`)
    /// - `FRAMEGATE_SESSION_TTL_SECS` — session idle expiry (default: `1800`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let zone = Zone::parse(std::env::var("ZONE").ok().as_deref());
        let port = parse_port(std::env::var("PORT").ok().as_deref());

        let server_tls =
            tls_paths("SERVER_KEY", "SERVER_CERT", "SERVER_CA_CHAIN").ok_or(ConfigError::MissingTls)?;
        let client_tls = tls_paths("CLIENT_KEY", "CLIENT_CERT", "CLIENT_CA_CHAIN");

        let storage_url = require_var("STORAGE_URL")?;
        let storage_url = normalize_base_url(&storage_url);
        let session_secret = require_var("SESSION_SECRET")?;

        let log_level =
            std::env::var("FRAMEGATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let session_ttl_secs = std::env::var("FRAMEGATE_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self {
            zone,
            port,
            server_tls,
            client_tls,
            storage_url,
            session_secret,
            log_level,
            session_ttl_secs,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Read a key/cert/chain triple from the environment. Returns `None`
/// unless all three variables are set and non-empty.
fn tls_paths(key: &str, cert: &str, ca_chain: &str) -> Option<TlsPaths> {
    let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    Some(TlsPaths {
        key: PathBuf::from(read(key)?),
        cert: PathBuf::from(read(cert)?),
        ca_chain: PathBuf::from(read(ca_chain)?),
    })
}

/// Parse a port number, falling back to 3000 for anything unusable.
fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|s| s.trim().parse::<u16>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(DEFAULT_PORT)
}

/// Strip trailing slashes from the upstream base URL.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_port_is_used() {
        assert_eq!(parse_port(Some("4000")), 4000);
        assert_eq!(parse_port(Some("5000")), 5000);
    }

    #[test]
    fn invalid_port_falls_back_to_3000() {
        assert_eq!(parse_port(Some("abc")), 3000);
        assert_eq!(parse_port(Some("")), 3000);
        assert_eq!(parse_port(None), 3000);
        assert_eq!(parse_port(Some("65536")), 3000);
        assert_eq!(parse_port(Some("0")), 3000);
    }

    #[test]
    fn known_zones_parse() {
        assert_eq!(Zone::parse(Some("dev")), Zone::Dev);
        assert_eq!(Zone::parse(Some("staging")), Zone::Staging);
        assert_eq!(Zone::parse(Some("prod")), Zone::Prod);
        assert_eq!(Zone::parse(Some("test")), Zone::Test);
    }

    #[test]
    fn unknown_zone_falls_back_to_prod() {
        assert_eq!(Zone::parse(Some("bla")), Zone::Prod);
        assert_eq!(Zone::parse(None), Zone::Prod);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(normalize_base_url("https://storage/"), "https://storage");
        assert_eq!(normalize_base_url("https://storage"), "https://storage");
    }
}
