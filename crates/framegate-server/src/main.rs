//! framegate server entry point.
//!
//! Loads configuration, builds the shared state (session store, token
//! guard, upstream storage client), and serves the router over TLS with
//! graceful shutdown on SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::info;

use framegate_core::guard::TokenGuard;
use framegate_session::MemoryStore;

use framegate_server::config::ServerConfig;
use framegate_server::session::CookieSigner;
use framegate_server::state::AppState;
use framegate_server::storage::StorageClient;
use framegate_server::{routes, tls};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("invalid configuration")?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    let storage = StorageClient::new(&config.storage_url, config.client_tls.as_ref())
        .context("failed to build storage client")?;

    let store = Arc::new(MemoryStore::with_idle_ttl(Duration::from_secs(
        config.session_ttl_secs,
    )));

    let state = Arc::new(AppState {
        guard: TokenGuard::new(store),
        storage,
        cookies: CookieSigner::new(config.session_secret.as_bytes()),
    });

    let app = routes::router(state);

    let tls_config =
        tls::load_server_config(&config.server_tls).context("failed to load server TLS identity")?;
    let acceptor = TlsAcceptor::from(tls_config);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind to port {}", config.port))?;

    info!(zone = %config.zone, port = config.port, "framegate started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(tls::serve(listener, acceptor, app, shutdown_rx));

    shutdown_signal(shutdown_tx).await;

    let _ = tokio::time::timeout(Duration::from_secs(10), server).await;
    info!("framegate stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
