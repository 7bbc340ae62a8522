use clap::Parser;

use forward_proxy::cli::Cli;
use forward_proxy::net::listener::Listener;
use forward_proxy::net::tls::TlsTerminator;
use forward_proxy::observability::{logging, metrics};
use forward_proxy::{ProxyServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    logging::init(&config.logging);

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        dial_timeout_ms = config.timeouts.dial_ms,
        excluded_headers = ?config.filter.excluded_headers,
        log_request_body = config.logging.log_request_body,
        log_response_body = config.logging.log_response_body,
        "Configuration loaded"
    );

    if config.metrics.enabled {
        match config.metrics.bind_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.bind_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let mut server = ProxyServer::new(config.clone())?;
    if let Some(tls) = &config.listener.tls {
        server = server.with_tls(TlsTerminator::from_config(tls).await?);
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
