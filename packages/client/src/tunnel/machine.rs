//! Single-resolution state machine for one tunnel attempt
//!
//! The machine performs no I/O. The connector reports what happened on the
//! socket and the machine decides the next state. Once it reaches
//! [`TunnelState::Resolved`] every further call fails with a `Spent` error.

use bytes::{Bytes, BytesMut};
use zeroize::Zeroizing;

use super::classify::{ErrorKind, Signal, TunnelFailure, classify};
use super::request::{TunnelRequest, encode_connect_request};
use super::response::{ParsedHead, ProxyResponse, parse_head};
use crate::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Idle,
    Connecting,
    RequestSent,
    AwaitingStatusLine,
    AwaitingHeaders,
    Resolved,
}

/// Terminal result of the machine.
#[derive(Debug)]
pub enum Resolution {
    /// 2xx and a complete head. `leftover` holds bytes that followed the
    /// blank line; they belong to the tunneled stream.
    Established { status: u16, leftover: Bytes },
    Failed(TunnelFailure),
}

#[derive(Debug)]
pub enum Step {
    NeedMore,
    Resolved(Resolution),
}

#[derive(Debug)]
pub struct TunnelMachine {
    state: TunnelState,
    head: BytesMut,
    max_head_bytes: usize,
}

impl TunnelMachine {
    #[must_use]
    pub fn new(max_head_bytes: usize) -> Self {
        Self {
            state: TunnelState::Idle,
            head: BytesMut::new(),
            max_head_bytes,
        }
    }

    #[must_use]
    pub fn state(&self) -> TunnelState {
        self.state
    }

    /// True once a status line has been accepted.
    #[must_use]
    pub fn status_received(&self) -> bool {
        self.state == TunnelState::AwaitingHeaders
    }

    /// `Idle → Connecting`.
    ///
    /// # Errors
    /// Fails if the machine is not idle.
    pub fn start(&mut self) -> crate::Result<()> {
        self.ensure_state(&[TunnelState::Idle])?;
        self.state = TunnelState::Connecting;
        Ok(())
    }

    /// Build the CONNECT head for `request`. The proxy credential is encoded
    /// fresh into the returned buffer, which is wiped on drop.
    ///
    /// # Errors
    /// Fails unless the machine is `Connecting`.
    pub fn connect_request(&self, request: &TunnelRequest) -> crate::Result<Zeroizing<Vec<u8>>> {
        self.ensure_state(&[TunnelState::Connecting])?;
        Ok(encode_connect_request(request.target(), request.proxy().credentials()))
    }

    /// `Connecting → RequestSent`, once the whole head is written.
    ///
    /// # Errors
    /// Fails unless the machine is `Connecting`.
    pub fn request_written(&mut self) -> crate::Result<()> {
        self.ensure_state(&[TunnelState::Connecting])?;
        self.state = TunnelState::RequestSent;
        Ok(())
    }

    /// Feed bytes read from the proxy, in arrival order.
    ///
    /// # Errors
    /// Fails if the request has not been sent or the machine already resolved.
    pub fn receive(&mut self, data: &[u8]) -> crate::Result<Step> {
        self.ensure_state(&[
            TunnelState::RequestSent,
            TunnelState::AwaitingStatusLine,
            TunnelState::AwaitingHeaders,
        ])?;
        if self.state == TunnelState::RequestSent {
            self.state = TunnelState::AwaitingStatusLine;
        }
        if data.is_empty() {
            return Ok(Step::NeedMore);
        }
        self.head.extend_from_slice(data);
        Ok(self.advance())
    }

    /// The proxy closed its side before the head was complete.
    ///
    /// # Errors
    /// Fails if the request has not been sent or the machine already resolved.
    pub fn receive_eof(&mut self) -> crate::Result<TunnelFailure> {
        self.ensure_state(&[
            TunnelState::RequestSent,
            TunnelState::AwaitingStatusLine,
            TunnelState::AwaitingHeaders,
        ])?;
        let bytes_received = self.head.len();
        Ok(self.resolve_failed(
            &Signal::Closed { bytes_received },
            format!("proxy closed the connection after {bytes_received} response bytes"),
        ))
    }

    /// Resolve with a failure observed outside the byte stream: resolution,
    /// socket errors, timeout or cancellation.
    ///
    /// # Errors
    /// Fails if the machine already resolved, or if `signal` is not a failure.
    pub fn fail(&mut self, signal: &Signal<'_>) -> crate::Result<TunnelFailure> {
        if self.state == TunnelState::Resolved {
            return Err(error::spent());
        }
        if classify(signal).is_none() {
            return Err(error::builder("signal does not describe a failure"));
        }
        let detail = match signal {
            Signal::Resolve(err) => format!("failed to resolve proxy host: {err}"),
            Signal::Io { error, .. } => format!("proxy socket error: {error}"),
            Signal::TimedOut => "tunnel attempt exceeded its deadline".to_owned(),
            Signal::Cancelled => "tunnel attempt cancelled".to_owned(),
            Signal::Closed { bytes_received } => {
                format!("proxy closed the connection after {bytes_received} response bytes")
            }
            Signal::Malformed => "malformed proxy response head".to_owned(),
            Signal::Response(response) => proxy_status_detail(response),
        };
        Ok(self.resolve_failed(signal, detail))
    }

    fn ensure_state(&self, allowed: &[TunnelState]) -> crate::Result<()> {
        if self.state == TunnelState::Resolved {
            return Err(error::spent());
        }
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(error::builder(format!(
                "invalid tunnel transition from {:?}",
                self.state
            )))
        }
    }

    fn advance(&mut self) -> Step {
        match parse_head(&self.head) {
            ParsedHead::Invalid(e) => {
                let failure = self.resolve_failed(&Signal::Malformed, format!("invalid proxy response head: {e}"));
                Step::Resolved(Resolution::Failed(failure))
            }
            ParsedHead::Complete { response, len } => {
                if response.is_success() && len > self.max_head_bytes {
                    return self.head_too_large();
                }
                Step::Resolved(self.establish(&response, len))
            }
            ParsedHead::StatusLine(response) => {
                if !response.is_success() {
                    let detail = proxy_status_detail(&response);
                    let failure = self.resolve_failed(&Signal::Response(&response), detail);
                    return Step::Resolved(Resolution::Failed(failure));
                }
                self.state = TunnelState::AwaitingHeaders;
                self.need_more()
            }
            ParsedHead::Incomplete => self.need_more(),
        }
    }

    fn need_more(&mut self) -> Step {
        if self.head.len() > self.max_head_bytes {
            return self.head_too_large();
        }
        Step::NeedMore
    }

    fn establish(&mut self, response: &ProxyResponse, head_end: usize) -> Resolution {
        if let Some(kind) = classify(&Signal::Response(response)) {
            let detail = proxy_status_detail(response);
            return Resolution::Failed(self.resolve_with(kind, detail));
        }

        let leftover = self.head.split_off(head_end).freeze();
        tracing::trace!(
            target: "proxytun::tunnel",
            status = response.status(),
            headers = response.headers().len(),
            leftover = leftover.len(),
            "Proxy response head complete"
        );
        self.finish();
        Resolution::Established {
            status: response.status(),
            leftover,
        }
    }

    fn head_too_large(&mut self) -> Step {
        let detail = format!("proxy response head exceeds {} bytes", self.max_head_bytes);
        Step::Resolved(Resolution::Failed(self.resolve_failed(&Signal::Malformed, detail)))
    }

    fn resolve_failed(&mut self, signal: &Signal<'_>, detail: impl Into<String>) -> TunnelFailure {
        let kind = classify(signal).unwrap_or(ErrorKind::Tunnel(super::TunnelFault::BadStatus));
        self.resolve_with(kind, detail)
    }

    fn resolve_with(&mut self, kind: ErrorKind, detail: impl Into<String>) -> TunnelFailure {
        self.finish();
        TunnelFailure::new(kind, detail)
    }

    fn finish(&mut self) {
        self.head.clear();
        self.state = TunnelState::Resolved;
    }
}

fn proxy_status_detail(response: &ProxyResponse) -> String {
    if response.reason().is_empty() {
        format!("proxy answered CONNECT with {}", response.status())
    } else {
        format!(
            "proxy answered CONNECT with {} {}",
            response.status(),
            response.reason()
        )
    }
}
