//! Command-line surface.
//!
//! Flags override values from the config file; the merged result is
//! validated again before use.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::ProxyConfig;

#[derive(Debug, Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward HTTP proxy with CONNECT tunneling and response header filtering", long_about = None)]
pub struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listening address, e.g. 0.0.0.0:8888.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Upstream dial timeout in milliseconds.
    #[arg(long)]
    pub dial_timeout_ms: Option<u64>,

    #[arg(long)]
    pub log_request_body: bool,

    #[arg(long)]
    pub log_response_body: bool,

    /// Dump the head of each CONNECT request.
    #[arg(long)]
    pub log_tunnel_requests: bool,

    /// Additional response header to strip (repeatable).
    #[arg(long = "exclude-header", value_name = "NAME")]
    pub exclude_headers: Vec<String>,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides.
    pub fn resolve(&self) -> Result<ProxyConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        let config = self.apply(config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(dial_ms) = self.dial_timeout_ms {
            config.timeouts.dial_ms = dial_ms;
        }
        config.logging.log_request_body |= self.log_request_body;
        config.logging.log_response_body |= self.log_response_body;
        config.logging.log_tunnel_requests |= self.log_tunnel_requests;
        config
            .filter
            .excluded_headers
            .extend(self.exclude_headers.iter().cloned());
        config
    }
}
