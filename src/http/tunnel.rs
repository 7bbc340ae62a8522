//! CONNECT handling.
//!
//! # Data Flow
//! ```text
//! CONNECT host:port
//!     → dial upstream (bounded by timeouts.dial_ms)   ── fail → 503
//!     → claim the client connection's upgrade handle  ── none → 500
//!     → 200 with empty body
//!     → hyper completes the upgrade → relay.rs
//! ```
//!
//! The upgrade can only resolve after the 200 has been written, so the relay
//! runs in its own task holding a tracker guard until both directions end.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::http::error::ProxyError;
use crate::http::server::AppState;
use crate::net::relay::relay;
use crate::observability::{logging, metrics};

/// Open a tunnel for a CONNECT request.
pub async fn handle_tunnel(
    state: &AppState,
    peer: SocketAddr,
    mut request: Request<Body>,
) -> Result<Response, ProxyError> {
    let authority = request
        .uri()
        .authority()
        .map(|a| a.to_string())
        .ok_or_else(|| ProxyError::InvalidTarget(format!("CONNECT target must be host:port, got '{}'", request.uri())))?;

    if state.config.logging.log_tunnel_requests {
        tracing::info!(
            peer_addr = %peer,
            "Tunnel request:\n{}",
            logging::dump_request_head(request.method(), request.uri(), request.version(), request.headers())
        );
    }

    let upstream = dial(&authority, state.config.timeouts.dial()).await?;

    let on_upgrade = request
        .extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or(ProxyError::TakeoverUnsupported)?;

    let guard = state.tracker.track();
    tokio::spawn(async move {
        let client = match on_upgrade.await {
            Ok(upgraded) => TokioIo::new(upgraded),
            Err(e) => {
                tracing::warn!(peer_addr = %peer, upstream = %authority, error = %e, "Connection takeover failed");
                return;
            }
        };

        tracing::debug!(connection_id = %guard.id(), peer_addr = %peer, upstream = %authority, "Tunnel established");
        metrics::tunnel_opened();
        let stats = relay(client, upstream).await;
        metrics::tunnel_closed(&stats);

        tracing::info!(
            connection_id = %guard.id(),
            peer_addr = %peer,
            upstream = %authority,
            client_to_upstream = stats.client_to_upstream,
            upstream_to_client = stats.upstream_to_client,
            "Tunnel closed"
        );
    });

    Ok(StatusCode::OK.into_response())
}

/// Dial `authority` over TCP, giving up after `timeout`.
pub async fn dial(authority: &str, timeout: Duration) -> Result<TcpStream, ProxyError> {
    let stream = match tokio::time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            return Err(ProxyError::Dial {
                authority: authority.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ProxyError::DialTimeout {
                authority: authority.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    };
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use tokio::net::TcpListener;

    fn connect_request(authority: &str) -> Request<Body> {
        Request::connect(authority).body(Body::empty()).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn refused_authority() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    #[tokio::test]
    async fn dial_failure_is_service_unavailable() {
        let state = AppState::new(ProxyConfig::default()).unwrap();
        let authority = refused_authority().await;

        let err = handle_tunnel(&state, peer(), connect_request(&authority)).await.unwrap_err();

        assert!(matches!(err, ProxyError::Dial { .. }));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn missing_upgrade_handle_is_internal_error() {
        let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let authority = upstream.local_addr().unwrap().to_string();
        let state = AppState::new(ProxyConfig::default()).unwrap();

        let err = handle_tunnel(&state, peer(), connect_request(&authority)).await.unwrap_err();

        assert!(matches!(err, ProxyError::TakeoverUnsupported));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn origin_form_target_is_rejected() {
        let state = AppState::new(ProxyConfig::default()).unwrap();
        let request = Request::connect("/status").body(Body::empty()).unwrap();

        let err = handle_tunnel(&state, peer(), request).await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidTarget(_)));
    }

    #[tokio::test]
    async fn dial_respects_timeout() {
        // Non-routable address: the SYN goes nowhere, so only the timeout ends the dial.
        let started = std::time::Instant::now();
        let err = dial("10.255.255.1:81", Duration::from_millis(100)).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(err, ProxyError::DialTimeout { .. } | ProxyError::Dial { .. }));
    }
}
