//! TLS handshake over an already-open byte stream
//!
//! Used for the handshake with the true target once a tunnel is established,
//! and for reaching `https://` proxies before CONNECT is sent.

use std::io;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error;

#[derive(Clone)]
pub struct TlsHandoff {
    connector: TlsConnector,
}

impl TlsHandoff {
    /// Trust the platform certificate store plus the bundled webpki roots.
    ///
    /// # Errors
    /// Fails if the rustls configuration cannot be built.
    pub fn with_default_roots() -> crate::Result<Self> {
        let mut roots = RootCertStore::empty();

        let native = rustls_native_certs::load_native_certs();
        for cert in native.certs {
            if let Err(e) = roots.add(cert) {
                tracing::warn!(target: "proxytun::tls", error = %e, "Failed to add system certificate");
            }
        }
        for err in &native.errors {
            tracing::warn!(target: "proxytun::tls", error = %err, "Certificate load error");
        }
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        tracing::debug!(target: "proxytun::tls", roots = roots.len(), "Loaded trust roots");
        Self::with_root_store(roots)
    }

    /// Trust exactly `roots`.
    ///
    /// # Errors
    /// Fails if the rustls configuration cannot be built.
    pub fn with_root_store(roots: RootCertStore) -> crate::Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(error::tls)?
            .with_root_certificates(roots)
            .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];
        Ok(Self::from_config(Arc::new(config)))
    }

    #[must_use]
    pub fn from_config(config: Arc<ClientConfig>) -> Self {
        Self {
            connector: TlsConnector::from(config),
        }
    }

    /// Run the client handshake on `transport` for `server_name`.
    ///
    /// # Errors
    /// `InvalidInput` for a server name rustls rejects; otherwise the handshake error.
    pub async fn handshake<S>(&self, transport: S, server_name: &str) -> io::Result<TlsStream<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.connector.connect(name, transport).await
    }
}

impl std::fmt::Debug for TlsHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsHandoff").finish_non_exhaustive()
    }
}
