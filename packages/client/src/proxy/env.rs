//! Explicit proxy environment snapshot
//!
//! The process environment is read once, into an immutable [`ProxyEnv`], and
//! the snapshot is passed to whoever needs it. Nothing reads `https_proxy`
//! while a tunnel attempt is in flight.

use super::endpoint::ProxyEndpoint;
use super::no_proxy::NoProxy;

#[derive(Debug, Clone, Default)]
pub struct ProxyEnv {
    http: Option<ProxyEndpoint>,
    https: Option<ProxyEndpoint>,
    no_proxy: Option<NoProxy>,
}

impl ProxyEnv {
    /// Snapshot `HTTPS_PROXY`, `HTTP_PROXY` and `NO_PROXY` (upper case first,
    /// then lower case).
    ///
    /// # Errors
    /// Returns a `MalformedLocator` error if a set proxy variable does not parse.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a snapshot from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns a `MalformedLocator` error if a set proxy variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |upper: &str, lower: &str| {
            lookup(upper)
                .or_else(|| lookup(lower))
                .filter(|value| !value.trim().is_empty())
        };

        let http = read("HTTP_PROXY", "http_proxy")
            .map(|raw| ProxyEndpoint::parse(&raw))
            .transpose()?;
        let https = read("HTTPS_PROXY", "https_proxy")
            .map(|raw| ProxyEndpoint::parse(&raw))
            .transpose()?;
        let no_proxy = read("NO_PROXY", "no_proxy").and_then(|raw| NoProxy::from_string(&raw));

        tracing::debug!(
            target: "proxytun::proxy",
            http = ?http.as_ref().map(ToString::to_string),
            https = ?https.as_ref().map(ToString::to_string),
            no_proxy = no_proxy.is_some(),
            "Proxy environment captured"
        );

        Ok(Self { http, https, no_proxy })
    }

    #[must_use]
    pub fn with_https_proxy(mut self, endpoint: ProxyEndpoint) -> Self {
        self.https = Some(endpoint);
        self
    }

    #[must_use]
    pub fn with_http_proxy(mut self, endpoint: ProxyEndpoint) -> Self {
        self.http = Some(endpoint);
        self
    }

    #[must_use]
    pub fn with_no_proxy(mut self, no_proxy: NoProxy) -> Self {
        self.no_proxy = Some(no_proxy);
        self
    }

    /// Proxy to use for a target with the given URL scheme, or `None` for a
    /// direct connection.
    #[must_use]
    pub fn proxy_for(&self, scheme: &str, host: &str) -> Option<&ProxyEndpoint> {
        if self.no_proxy.as_ref().is_some_and(|rules| rules.matches(host)) {
            return None;
        }
        match scheme {
            "https" => self.https.as_ref(),
            "http" => self.http.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn no_proxy(&self) -> Option<&NoProxy> {
        self.no_proxy.as_ref()
    }
}
