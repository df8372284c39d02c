//! Fetch failures
//!
//! A proxy that refuses CONNECT surfaces here as [`FetchError::Tunnel`],
//! never as a [`crate::FetchResponse`] carrying the proxy's status.

use std::io;

use proxytun_client::TunnelFailure;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("configuration error: {0}")]
    Config(#[from] proxytun_client::Error),

    #[error("proxy tunnel failed: {0}")]
    Tunnel(#[from] TunnelFailure),

    #[error("direct connection failed: {0}")]
    Connect(#[source] io::Error),

    #[error("TLS handshake with origin failed: {0}")]
    Tls(#[source] io::Error),

    #[error("HTTP exchange failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("response body is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// The tunnel failure, when the proxy hop is what failed.
    #[must_use]
    pub fn tunnel_failure(&self) -> Option<&TunnelFailure> {
        match self {
            FetchError::Tunnel(failure) => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_tunnel(&self) -> bool {
        matches!(self, FetchError::Tunnel(_))
    }

    /// Proxy rejected the credentials.
    #[must_use]
    pub fn is_proxy_auth(&self) -> bool {
        self.tunnel_failure().is_some_and(TunnelFailure::is_auth)
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
