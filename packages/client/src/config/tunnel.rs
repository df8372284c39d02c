//! Tunnel connector configuration
//!
//! Defaults mirror a conservative forward-proxy client: short connect
//! deadline, small response-head limit, `TCP_NODELAY` on.

use std::time::Duration;

use crate::tls::TlsHandoff;

/// Connector-wide settings shared by every tunnel attempt.
#[derive(Debug, Clone)]
pub struct TunnelConfig {
    /// Deadline applied to requests built through [`TunnelConfig::request`].
    pub connect_timeout: Duration,

    /// Largest proxy response head accepted before the attempt is failed.
    pub max_head_bytes: usize,

    /// Enable `TCP_NODELAY` on the proxy socket
    pub tcp_nodelay: bool,

    /// TCP keep-alive idle time
    pub tcp_keepalive: Option<Duration>,

    /// TLS settings for `https://` proxies. Platform roots when `None`.
    pub proxy_tls: Option<TlsHandoff>,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            max_head_bytes: 16 * 1024,
            tcp_nodelay: true,
            tcp_keepalive: Some(Duration::from_secs(60)),
            proxy_tls: None,
        }
    }
}

impl TunnelConfig {
    /// Set the default tunnel deadline
    ///
    /// Covers resolving the proxy, connecting, sending CONNECT and reading the
    /// whole reply head.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use proxytun_client::TunnelConfig;
    ///
    /// let config = TunnelConfig::default().with_connect_timeout(Duration::from_secs(3));
    /// assert_eq!(config.connect_timeout, Duration::from_secs(3));
    /// ```
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_head_bytes(mut self, max: usize) -> Self {
        self.max_head_bytes = max;
        self
    }

    #[must_use]
    pub fn with_tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    #[must_use]
    pub fn with_tcp_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.tcp_keepalive = keepalive;
        self
    }

    #[must_use]
    pub fn with_proxy_tls(mut self, tls: TlsHandoff) -> Self {
        self.proxy_tls = Some(tls);
        self
    }

    /// Build a [`crate::TunnelRequest`] using the configured deadline.
    ///
    /// # Errors
    /// See [`crate::TunnelRequest::new`].
    pub fn request(
        &self,
        target: crate::TargetAddr,
        proxy: crate::ProxyEndpoint,
    ) -> crate::Result<crate::TunnelRequest> {
        crate::TunnelRequest::new(target, proxy, self.connect_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProxyEndpoint, TargetAddr};

    #[test]
    fn defaults() {
        let config = TunnelConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_head_bytes, 16 * 1024);
        assert!(config.tcp_nodelay);
        assert!(config.proxy_tls.is_none());
    }

    #[test]
    fn request_carries_configured_deadline() {
        let config = TunnelConfig::default().with_connect_timeout(Duration::from_millis(750));
        let request = config
            .request(
                TargetAddr::new("example.com", 443).expect("target"),
                ProxyEndpoint::parse("proxy.local:3128").expect("proxy"),
            )
            .expect("request");
        assert_eq!(request.timeout(), Duration::from_millis(750));
    }
}
