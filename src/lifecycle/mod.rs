//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → accept loop stops → connections finish gracefully
//!             → server waits (bounded) for connections and tunnels to drain
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
