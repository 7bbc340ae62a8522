//! Request classification and routing to the tunnel or forward path.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::http::{forward, tunnel};
use crate::observability::metrics;

/// Which path a request takes through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// CONNECT: open an opaque byte tunnel.
    Tunnel,
    /// Any other method: plaintext HTTP round trip.
    Forward,
}

impl RequestKind {
    pub fn classify(method: &Method) -> Self {
        if method == Method::CONNECT {
            RequestKind::Tunnel
        } else {
            RequestKind::Forward
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Tunnel => "tunnel",
            RequestKind::Forward => "forward",
        }
    }
}

/// Entry point for every proxied request.
pub async fn dispatch(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let kind = RequestKind::classify(request.method());

    tracing::info!(
        peer_addr = %peer,
        method = %request.method(),
        uri = %request.uri(),
        kind = kind.as_str(),
        "Proxy request"
    );

    let result = match kind {
        RequestKind::Tunnel => tunnel::handle_tunnel(&state, peer, request).await,
        RequestKind::Forward => forward::handle_forward(&state, peer, request).await,
    };

    let response = result.unwrap_or_else(|e| {
        tracing::warn!(peer_addr = %peer, kind = kind.as_str(), error = %e, "Proxy request failed");
        e.into_response()
    });

    metrics::record_request(kind.as_str(), response.status().as_u16(), start);
    response
}
