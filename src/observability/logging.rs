//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Render request/response heads for debug dumps
//! - Observe body frames as they stream through, without altering them
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via config and `RUST_LOG`
//! - Body logging taps frames in flight; nothing is buffered or replaced

use std::fmt::Write as _;

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{HeaderMap, Method, StatusCode, Uri, Version};
use http_body_util::BodyExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
pub fn init(config: &LoggingConfig) {
    let default_filter = format!("forward_proxy={},tower_http=info", config.level());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Render a request head the way it would appear on the wire.
pub fn dump_request_head(method: &Method, uri: &Uri, version: Version, headers: &HeaderMap) -> String {
    let mut out = format!("{} {} {:?}\r\n", method, uri, version);
    write_headers(&mut out, headers);
    out
}

/// Render a response head the way it would appear on the wire.
pub fn dump_response_head(status: StatusCode, version: Version, headers: &HeaderMap) -> String {
    let mut out = format!("{:?} {}\r\n", version, status);
    write_headers(&mut out, headers);
    out
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let _ = write!(out, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
}

/// Wrap `body` so every data frame is logged as it passes through.
///
/// Callers wrap only when body logging is switched on, so chunks are logged
/// at info and show up under the default filter. Frames, trailers and errors
/// are forwarded untouched.
pub fn observe_body<B>(body: B, label: &'static str, upstream: String) -> Body
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    Body::new(body.map_frame(move |frame| {
        if let Some(data) = frame.data_ref() {
            tracing::info!(
                body = label,
                upstream = %upstream,
                len = data.len(),
                chunk = %String::from_utf8_lossy(data),
                "Body chunk"
            );
        }
        frame
    }))
}
