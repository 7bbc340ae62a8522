//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (HTTP/1.1 connection with upgrades)
//!     → dispatch.rs (CONNECT or not)
//!         → tunnel.rs (dial, take over connection, relay bytes)
//!         → forward.rs (round trip, filter headers, stream body)
//!     → error.rs (failures rendered as plain-text status responses)
//! ```

pub mod dispatch;
pub mod error;
pub mod forward;
pub mod server;
pub mod tunnel;

pub use dispatch::RequestKind;
pub use error::ProxyError;
pub use server::{AppState, ProxyServer, ServerError};
