//! Bidirectional byte relay for CONNECT tunnels.
//!
//! # Data Flow
//! ```text
//! Client ──── pump(client → upstream) ────▶ Upstream
//! Client ◀─── pump(upstream → client) ──── Upstream
//! ```
//!
//! Each direction runs as its own task and copies until its source hits EOF
//! or errors, then half-closes its destination. The first direction to finish
//! aborts the other, which drops the remaining halves and closes both sockets,
//! so a tunnel never lingers half-open. Tunneled bytes are never inspected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinError;

const RELAY_BUFFER_SIZE: usize = 16 * 1024;

/// One leg of a tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToUpstream,
    UpstreamToClient,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ClientToUpstream => "client_to_upstream",
            Direction::UpstreamToClient => "upstream_to_client",
        }
    }
}

/// Bytes moved in each direction over the life of a tunnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub client_to_upstream: u64,
    pub upstream_to_client: u64,
}

/// Relay bytes between `client` and `upstream` until either side is done.
///
/// Both streams are closed by the time this returns.
pub async fn relay<C, U>(client: C, upstream: U) -> RelayStats
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    U: AsyncRead + AsyncWrite + Send + 'static,
{
    let (client_read, client_write) = tokio::io::split(client);
    let (upstream_read, upstream_write) = tokio::io::split(upstream);

    let uploaded = Arc::new(AtomicU64::new(0));
    let downloaded = Arc::new(AtomicU64::new(0));

    let mut upload = tokio::spawn(pump(client_read, upstream_write, Arc::clone(&uploaded)));
    let mut download = tokio::spawn(pump(upstream_read, client_write, Arc::clone(&downloaded)));

    tokio::select! {
        finished = &mut upload => {
            download.abort();
            log_outcome(Direction::ClientToUpstream, finished);
            log_outcome(Direction::UpstreamToClient, download.await);
        }
        finished = &mut download => {
            upload.abort();
            log_outcome(Direction::UpstreamToClient, finished);
            log_outcome(Direction::ClientToUpstream, upload.await);
        }
    }

    RelayStats {
        client_to_upstream: uploaded.load(Ordering::Relaxed),
        upstream_to_client: downloaded.load(Ordering::Relaxed),
    }
}

async fn pump<R, W>(mut from: R, mut to: W, transferred: Arc<AtomicU64>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];
    loop {
        let n = from.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        to.write_all(&buf[..n]).await?;
        transferred.fetch_add(n as u64, Ordering::Relaxed);
    }
    to.shutdown().await
}

fn log_outcome(direction: Direction, outcome: Result<std::io::Result<()>, JoinError>) {
    match outcome {
        Ok(Ok(())) => tracing::trace!(direction = direction.as_str(), "Relay direction reached EOF"),
        Ok(Err(e)) => tracing::debug!(direction = direction.as_str(), error = %e, "Relay direction failed"),
        Err(e) if e.is_cancelled() => {
            tracing::trace!(direction = direction.as_str(), "Relay direction closed by peer direction")
        }
        Err(e) => tracing::warn!(direction = direction.as_str(), error = %e, "Relay task panicked"),
    }
}
