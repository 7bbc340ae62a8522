//! HTTP serving layer.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener, one task per connection
//! - Optionally terminate TLS on the listening socket
//! - Serve HTTP/1.1 only, with upgrades enabled for CONNECT takeover
//! - Route every request through the dispatcher
//! - Drain connections and tunnels on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::ConnectInfo, http::header::InvalidHeaderName, http::Request, Router};
use hyper::{body::Incoming, server::conn::http1};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioIo},
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::dispatch::dispatch;
use crate::net::connection::{ConnectionId, ConnectionTracker};
use crate::net::listener::{Listener, ListenerError};
use crate::net::tls::TlsTerminator;
use crate::security::ExclusionSet;

/// Failures that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid excluded header: {0}")]
    InvalidExclusion(#[from] InvalidHeaderName),

    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
///
/// Read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub exclusions: Arc<ExclusionSet>,
    pub client: Client<HttpConnector, Body>,
    pub tracker: ConnectionTracker,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, InvalidHeaderName> {
        let exclusions = ExclusionSet::from_config(&config.filter)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeouts.dial()));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            config: Arc::new(config),
            exclusions: Arc::new(exclusions),
            client,
            tracker: ConnectionTracker::new(),
        })
    }
}

/// HTTP server for the forward proxy.
pub struct ProxyServer {
    router: Router,
    state: AppState,
    tls: Option<TlsTerminator>,
}

impl ProxyServer {
    /// Create a new proxy server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::new(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            state,
            tls: None,
        })
    }

    /// Terminate TLS on accepted connections before speaking HTTP.
    pub fn with_tls(mut self, tls: TlsTerminator) -> Self {
        self.tls = Some(tls);
        self
    }

    /// CONNECT targets are authority-form and carry no path, so everything
    /// lands on the fallback.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain.
    ///
    /// A dropped shutdown sender counts as a shutdown signal.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tls = self.tls.is_some(),
            available_permits = listener.available_permits(),
            "Proxy server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Closed) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            continue;
                        }
                    };

                    let guard = self.state.tracker.track();
                    let router = self.router.clone();
                    let tls = self.tls.clone();
                    let conn_shutdown = shutdown.resubscribe();

                    tokio::spawn(async move {
                        let _permit = permit;
                        let connection_id = guard.id();
                        match tls {
                            Some(tls) => match tls.accept(stream).await {
                                Ok(stream) => serve_connection(stream, peer, connection_id, router, conn_shutdown).await,
                                Err(e) => tracing::debug!(connection_id = %connection_id, peer_addr = %peer, error = %e, "TLS handshake failed"),
                            },
                            None => serve_connection(stream, peer, connection_id, router, conn_shutdown).await,
                        }
                        drop(guard);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        drop(listener);

        let deadline = self.state.config.timeouts.shutdown_drain();
        if !self.state.tracker.wait_for_drain(deadline).await {
            tracing::warn!(
                remaining = self.state.tracker.active_count(),
                "Drain deadline passed with sessions still open"
            );
        }

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

async fn serve_connection<I>(
    io: I,
    peer: SocketAddr,
    connection_id: ConnectionId,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(peer));
        router.clone().oneshot(request)
    });

    let conn = http1::Builder::new()
        .preserve_header_case(true)
        .title_case_headers(true)
        .serve_connection(TokioIo::new(io), service)
        .with_upgrades();
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = result {
        tracing::debug!(connection_id = %connection_id, peer_addr = %peer, error = %e, "Connection ended with error");
    }
}
