//! Request-level failures and the status each one maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that end the handling of a single proxied request.
///
/// None of these are retried; each is reported once to the client.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request does not name a usable upstream.
    #[error("Invalid proxy target: {0}")]
    InvalidTarget(String),

    /// The upstream could not be dialed.
    #[error("Failed to connect to {authority}: {source}")]
    Dial {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    /// The upstream dial did not complete in time.
    #[error("Timed out connecting to {authority} after {timeout_ms} ms")]
    DialTimeout { authority: String, timeout_ms: u64 },

    /// The client connection cannot be handed off as a raw stream.
    #[error("Tunneling (connection takeover) not supported")]
    TakeoverUnsupported,

    /// The forward request target carries no scheme and host to send it to.
    #[error("Upstream request failed: no scheme or host in '{0}'")]
    NotAbsolute(String),

    /// The forward round trip failed before a response head arrived.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Dial { .. } | ProxyError::DialTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::TakeoverUnsupported => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::NotAbsolute(_) | ProxyError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
