use crate::connect::TunnelStream;

use super::classify::TunnelFailure;

/// Terminal result of [`crate::ProxyTunnelConnector::connect`].
///
/// Exactly one outcome is produced per request.
#[derive(Debug)]
pub enum TunnelOutcome {
    Established(Established),
    Failed(TunnelFailure),
}

impl TunnelOutcome {
    #[must_use]
    pub fn is_established(&self) -> bool {
        matches!(self, TunnelOutcome::Established(_))
    }

    #[must_use]
    pub fn failure(&self) -> Option<&TunnelFailure> {
        match self {
            TunnelOutcome::Failed(failure) => Some(failure),
            TunnelOutcome::Established(_) => None,
        }
    }

    /// Consume the outcome, transferring ownership of the transport on success.
    ///
    /// # Errors
    /// Returns the failure when the tunnel was not established.
    pub fn into_result(self) -> Result<TunnelStream, TunnelFailure> {
        match self {
            TunnelOutcome::Established(established) => Ok(established.into_stream()),
            TunnelOutcome::Failed(failure) => Err(failure),
        }
    }
}

/// An open tunnel, ready for the TLS handshake with the target.
#[derive(Debug)]
pub struct Established {
    stream: TunnelStream,
    proxy_status: u16,
}

impl Established {
    pub(crate) fn new(stream: TunnelStream, proxy_status: u16) -> Self {
        Self { stream, proxy_status }
    }

    /// The 2xx code the proxy used to accept CONNECT. This is never the
    /// target's response status.
    #[must_use]
    pub fn proxy_status(&self) -> u16 {
        self.proxy_status
    }

    #[must_use]
    pub fn into_stream(self) -> TunnelStream {
        self.stream
    }
}
