//! Forward HTTP(S) Proxy Library
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    FORWARD PROXY                      │
//!                      │                                                       │
//!   Client request     │  ┌─────────┐   ┌─────────┐   ┌────────────┐           │
//!   ───────────────────┼─▶│   net   │──▶│  http   │──▶│  dispatch  │           │
//!                      │  │listener │   │ server  │   └─────┬──────┘           │
//!                      │  └─────────┘   └─────────┘         │                  │
//!                      │                        CONNECT ┌───┴───┐ other         │
//!                      │                                ▼       ▼               │
//!                      │                        ┌─────────┐ ┌─────────┐         │
//!                      │                        │ tunnel  │ │ forward │◀────────┼──── Upstream
//!                      │                        └────┬────┘ └────┬────┘         │
//!                      │                             ▼           ▼              │
//!                      │                       ┌──────────┐ ┌──────────────┐    │
//!                      │                       │net::relay│ │security::    │    │
//!                      │                       │ (bytes)  │ │headers filter│    │
//!                      │                       └──────────┘ └──────────────┘    │
//!                      │                                                       │
//!                      │  config · observability · lifecycle                   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
