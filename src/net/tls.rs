//! TLS termination for the proxy's own listening socket.

use std::path::Path;
use std::sync::Arc;

use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::config::TlsConfig;

/// Load TLS configuration from certificate and key files.
///
/// Only `http/1.1` is advertised over ALPN; the proxy never speaks HTTP/2.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    let loaded = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    let mut server_config = (*loaded.get_inner()).clone();
    server_config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

/// Performs the server side of the TLS handshake on accepted sockets.
#[derive(Clone)]
pub struct TlsTerminator {
    acceptor: RustlsAcceptor,
}

impl TlsTerminator {
    pub async fn from_config(config: &TlsConfig) -> Result<Self, std::io::Error> {
        let tls = load_tls_config(Path::new(&config.cert_path), Path::new(&config.key_path)).await?;
        Ok(Self {
            acceptor: RustlsAcceptor::new(tls),
        })
    }

    pub async fn accept(
        &self,
        stream: TcpStream,
    ) -> Result<impl AsyncRead + AsyncWrite + Unpin + Send + 'static, std::io::Error> {
        let (tls_stream, ()) = self.acceptor.accept(stream, ()).await?;
        Ok(tls_stream)
    }
}
