//! TLS listener.
//!
//! Loads the server's PEM identity from the configured paths and serves
//! the router over rustls: accept, handshake, then hand the stream to
//! hyper. Handshake failures drop the connection without affecting the
//! accept loop.

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig as RustlsServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

use crate::config::TlsPaths;

/// Build a rustls server config from the PEM files at the given paths.
///
/// The presented chain is the server certificate followed by the CA
/// chain back to the root.
///
/// # Errors
///
/// Fails when a file cannot be read or contains no usable PEM material.
pub fn load_server_config(paths: &TlsPaths) -> anyhow::Result<Arc<RustlsServerConfig>> {
    let mut certs = read_certs(&paths.cert)?;
    certs.extend(read_certs(&paths.ca_chain)?);

    let key = read_key(&paths.key)?;

    let config = RustlsServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("invalid server certificate or key")?;

    Ok(Arc::new(config))
}

fn read_certs(path: &std::path::Path) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let pem = fs::read(path)
        .with_context(|| format!("failed to read certificate file {}", path.display()))?;
    let certs: Vec<_> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid PEM in {}", path.display()))?;
    anyhow::ensure!(!certs.is_empty(), "no certificates in {}", path.display());
    Ok(certs)
}

fn read_key(path: &std::path::Path) -> anyhow::Result<PrivateKeyDer<'static>> {
    let pem =
        fs::read(path).with_context(|| format!("failed to read key file {}", path.display()))?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .with_context(|| format!("invalid PEM in {}", path.display()))?
        .with_context(|| format!("no private key in {}", path.display()))
}

/// Serve the router over TLS until a shutdown signal arrives.
///
/// Each accepted connection is handled in its own task; a handshake or
/// connection error is logged and dropped.
///
/// # Errors
///
/// Returns an error only when the accept loop itself fails fatally.
pub async fn serve(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };

                let acceptor = acceptor.clone();
                let service = TowerToHyperService::new(app.clone());

                tokio::spawn(async move {
                    let tls_stream = match acceptor.accept(stream).await {
                        Ok(s) => s,
                        Err(e) => {
                            debug!(peer = %peer, error = %e, "TLS handshake failed");
                            return;
                        }
                    };

                    if let Err(e) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(tls_stream), service)
                        .await
                    {
                        debug!(peer = %peer, error = %e, "connection error");
                    }
                });
            }
            _ = shutdown.changed() => {
                info!("listener shutting down");
                return Ok(());
            }
        }
    }
}
