//! Plaintext HTTP forwarding.
//!
//! # Responsibilities
//! - Require an absolute-form request target
//! - Send the request upstream unchanged and wait for the response head
//! - Strip excluded headers from the response
//! - Stream the response body back without buffering it
//!
//! Diagnostic dumps never change what either side receives.

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{Request, Uri},
    response::Response,
};

use crate::http::error::ProxyError;
use crate::http::server::AppState;
use crate::observability::logging;
use crate::security::filter_headers;

/// Forward a non-CONNECT request and relay the filtered response.
pub async fn handle_forward(
    state: &AppState,
    peer: SocketAddr,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (mut parts, body) = request.into_parts();
    parts.uri = upstream_uri(&parts.uri)?;
    let upstream = parts.uri.to_string();
    let logging_config = &state.config.logging;

    tracing::debug!(
        peer_addr = %peer,
        "HTTP request:\n{}",
        logging::dump_request_head(&parts.method, &parts.uri, parts.version, &parts.headers)
    );

    let body = if logging_config.log_request_body {
        logging::observe_body(body, "request", upstream.clone())
    } else {
        body
    };

    let response = state.client.request(Request::from_parts(parts, body)).await?;
    let (mut parts, body) = response.into_parts();

    tracing::debug!(
        peer_addr = %peer,
        upstream = %upstream,
        "HTTP raw response:\n{}",
        logging::dump_response_head(parts.status, parts.version, &parts.headers)
    );

    parts.headers = filter_headers(&parts.headers, &state.exclusions);

    tracing::debug!(
        peer_addr = %peer,
        upstream = %upstream,
        "HTTP final response:\n{}",
        logging::dump_response_head(parts.status, parts.version, &parts.headers)
    );

    let body = if logging_config.log_response_body {
        logging::observe_body(body, "response", upstream)
    } else {
        Body::new(body)
    };

    Ok(Response::from_parts(parts, body))
}

/// The URI to send upstream.
///
/// Only absolute-form targets name an upstream. An origin-form target is
/// addressed to the proxy itself, and `Host` is never used to pick the
/// upstream, so such a request can not be routed back into the proxy.
pub fn upstream_uri(uri: &Uri) -> Result<Uri, ProxyError> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        Ok(uri.clone())
    } else {
        Err(ProxyError::NotAbsolute(uri.to_string()))
    }
}
