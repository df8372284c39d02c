//! Closed failure taxonomy for tunnel attempts

use std::io;

use super::response::ProxyResponse;

/// Why the transport to the proxy never became usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ConnectFailure {
    #[error("timed out")]
    Timeout,
    #[error("proxy host could not be resolved")]
    DnsFailure,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("cancelled")]
    Cancelled,
    /// Any other transport failure before a status line arrived (reset, unreachable, write failure).
    #[error("network failure")]
    Network,
}

/// The proxy answered but did not open a tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TunnelFault {
    #[error("malformed proxy response")]
    BadStatus,
    #[error("proxy closed the connection")]
    UnexpectedClose,
    #[error("proxy refused tunnel with status {0}")]
    UnexpectedStatus(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("proxy connect error: {0}")]
    Connect(ConnectFailure),
    #[error("tunnel error: {0}")]
    Tunnel(TunnelFault),
    #[error("proxy authentication rejected")]
    Auth,
}

impl ErrorKind {
    /// Whether retrying the same request unchanged can succeed.
    ///
    /// `Auth` needs new credentials and `Cancelled` was the caller's choice.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Connect(failure) if failure != ConnectFailure::Cancelled)
    }

    /// Short label for structured logs.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Connect(ConnectFailure::Timeout) => "timeout",
            ErrorKind::Connect(ConnectFailure::Cancelled) => "cancelled",
            ErrorKind::Connect(_) => "connect",
            ErrorKind::Tunnel(_) => "tunnel",
            ErrorKind::Auth => "auth",
        }
    }
}

/// Terminal failure of one tunnel attempt.
///
/// `detail` is diagnostic text; it never contains credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({detail})")]
pub struct TunnelFailure {
    kind: ErrorKind,
    detail: String,
}

impl TunnelFailure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }

    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.kind, ErrorKind::Connect(_))
    }

    #[must_use]
    pub fn is_tunnel(&self) -> bool {
        matches!(self.kind, ErrorKind::Tunnel(_))
    }
}

/// Something observed during an attempt that may end it.
#[derive(Debug)]
pub enum Signal<'a> {
    /// Resolving the proxy host failed.
    Resolve(&'a io::Error),
    /// A socket operation failed.
    Io {
        error: &'a io::Error,
        status_received: bool,
    },
    /// The attempt deadline passed.
    TimedOut,
    /// The caller cancelled the attempt.
    Cancelled,
    /// The proxy closed the connection.
    Closed { bytes_received: usize },
    /// The reply head could not be parsed.
    Malformed,
    /// A complete status line was parsed.
    Response(&'a ProxyResponse),
}

/// Map a signal to its error kind, or `None` when it means success.
#[must_use]
pub fn classify(signal: &Signal<'_>) -> Option<ErrorKind> {
    let kind = match signal {
        Signal::Resolve(_) => ErrorKind::Connect(ConnectFailure::DnsFailure),
        Signal::Io {
            status_received: true,
            ..
        } => ErrorKind::Tunnel(TunnelFault::UnexpectedClose),
        Signal::Io { error, .. } => ErrorKind::Connect(match error.kind() {
            io::ErrorKind::ConnectionRefused => ConnectFailure::ConnectionRefused,
            io::ErrorKind::TimedOut => ConnectFailure::Timeout,
            _ => ConnectFailure::Network,
        }),
        Signal::TimedOut => ErrorKind::Connect(ConnectFailure::Timeout),
        Signal::Cancelled => ErrorKind::Connect(ConnectFailure::Cancelled),
        Signal::Closed { bytes_received: 0 } => ErrorKind::Tunnel(TunnelFault::UnexpectedClose),
        Signal::Closed { .. } | Signal::Malformed => ErrorKind::Tunnel(TunnelFault::BadStatus),
        Signal::Response(response) => match response.status() {
            200..=299 => return None,
            407 => ErrorKind::Auth,
            code => ErrorKind::Tunnel(TunnelFault::UnexpectedStatus(code)),
        },
    };
    Some(kind)
}
