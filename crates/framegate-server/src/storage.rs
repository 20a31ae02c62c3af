//! Upstream storage client.
//!
//! A thin HTTPS client over the storage service's user-data API,
//! authenticated with a mutual-TLS client identity loaded once at startup.
//! One attempt per call, no retries — transient upstream failures surface
//! directly to the caller, which reports them to the user.

use std::fs;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::config::TlsPaths;

/// Errors from upstream storage calls.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream responded with an error payload. The status code and
    /// message come from the response body when present, else 500.
    #[error("{message}")]
    Reported { status_code: u16, message: String },

    /// The request was sent but no response arrived.
    #[error("No response from storage server")]
    NoResponse,

    /// The request never left this process, or the response body was
    /// unusable.
    #[error("storage request failed: {reason}")]
    Request { reason: String },
}

/// Error payload shape reported by the storage service.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    message: Option<String>,
}

/// HTTPS client for the upstream storage service.
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    /// Build a client for the given base URL.
    ///
    /// When `client_tls` is present, the PEM key and certificate become the
    /// client identity and the CA chain becomes the trusted roots —
    /// mutual TLS against the storage service. The identity is immutable
    /// for the process lifetime.
    ///
    /// # Errors
    ///
    /// Fails when the TLS files cannot be read or parsed, or the HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, client_tls: Option<&TlsPaths>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();

        if let Some(tls) = client_tls {
            let mut identity_pem = fs::read(&tls.cert)
                .with_context(|| format!("failed to read client cert {}", tls.cert.display()))?;
            let key_pem = fs::read(&tls.key)
                .with_context(|| format!("failed to read client key {}", tls.key.display()))?;
            identity_pem.extend_from_slice(&key_pem);

            let identity = reqwest::Identity::from_pem(&identity_pem)
                .context("invalid client TLS identity")?;
            builder = builder.identity(identity);

            let ca_pem = fs::read(&tls.ca_chain).with_context(|| {
                format!("failed to read client CA chain {}", tls.ca_chain.display())
            })?;
            for cert in reqwest::Certificate::from_pem_bundle(&ca_pem)
                .context("invalid client CA chain")?
            {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build().context("failed to build storage client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch the user-data document addressed by a key path.
    ///
    /// `GET {base}/users/info/{keyPath}`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] per the uniform translation rules.
    pub async fn fetch_value(&self, key_path: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/users/info/{}", self.base_url, key_path);
        let response = self.http.get(&url).send().await.map_err(translate_send)?;
        let response = check_status(response).await?;

        response.json().await.map_err(|e| UpstreamError::Request {
            reason: format!("invalid JSON from storage server: {e}"),
        })
    }

    /// Apply a partial update to the user-data document.
    ///
    /// `PATCH {base}/users` with body `{"info": patch}`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] per the uniform translation rules.
    pub async fn patch_value(&self, patch: &Value) -> Result<(), UpstreamError> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .http
            .patch(&url)
            .json(&serde_json::json!({ "info": patch }))
            .send()
            .await
            .map_err(translate_send)?;
        check_status(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Translate a send-phase failure: the request went out but nothing came
/// back → 502; a local construction failure → 500.
fn translate_send(err: reqwest::Error) -> UpstreamError {
    if err.is_builder() {
        UpstreamError::Request {
            reason: err.to_string(),
        }
    } else {
        UpstreamError::NoResponse
    }
}

/// Pass 2xx responses through; translate everything else into the error
/// reported by the upstream body, defaulting to 500.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<UpstreamErrorBody>(&body).ok();

    Err(UpstreamError::Reported {
        status_code: parsed
            .as_ref()
            .and_then(|b| b.status_code)
            .unwrap_or(500),
        message: parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("storage server returned HTTP {}", status.as_u16())),
    })
}
