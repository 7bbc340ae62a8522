//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream response headers
//!     → headers.rs (drop excluded names)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - Exclusion set is built once at startup and shared read-only
//! - Filtering applies to the response path only; requests go upstream verbatim

pub mod headers;

pub use headers::{filter_headers, ExclusionSet};
