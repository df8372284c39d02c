//! Builder for [`ProxyFetcher`]

use std::sync::Arc;

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use proxytun_client::{ProxyEndpoint, ProxyEnv, RootCertStore, TlsHandoff, TunnelConfig};

use crate::error::Result;
use crate::fetcher::{Inner, ProxyFetcher};

const DEFAULT_USER_AGENT: &str = concat!("proxytun/", env!("CARGO_PKG_VERSION"));

/// Configures how a [`ProxyFetcher`] reaches origins.
///
/// An explicit [`proxy`](Self::proxy) takes precedence over the one
/// selected from [`proxy_env`](Self::proxy_env); the environment's
/// `NO_PROXY` list still applies to it.
#[derive(Debug, Default)]
pub struct ProxyFetcherBuilder {
    proxy: Option<ProxyEndpoint>,
    proxy_env: Option<ProxyEnv>,
    root_store: Option<RootCertStore>,
    tunnel_config: TunnelConfig,
    user_agent: Option<HeaderValue>,
    headers: HeaderMap,
}

impl ProxyFetcherBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn proxy(mut self, endpoint: ProxyEndpoint) -> Self {
        self.proxy = Some(endpoint);
        self
    }

    /// Use proxies and bypass rules from an environment snapshot
    #[must_use]
    pub fn proxy_env(mut self, env: ProxyEnv) -> Self {
        self.proxy_env = Some(env);
        self
    }

    /// Trust only these roots for origins and `https://` proxies.
    #[must_use]
    pub fn root_store(mut self, roots: RootCertStore) -> Self {
        self.root_store = Some(roots);
        self
    }

    #[must_use]
    pub fn tunnel_config(mut self, config: TunnelConfig) -> Self {
        self.tunnel_config = config;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, value: HeaderValue) -> Self {
        self.user_agent = Some(value);
        self
    }

    /// Add a header sent to the origin on every fetch.
    ///
    /// `Proxy-Authorization` is dropped: proxy credentials belong to the
    /// proxy endpoint and never travel inside the tunnel.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name == header::PROXY_AUTHORIZATION {
            tracing::warn!(target: "proxytun::fetch", "Ignoring Proxy-Authorization origin header");
            return self;
        }
        self.headers.append(name, value);
        self
    }

    /// # Errors
    /// Fails if the TLS configuration cannot be built.
    pub fn build(self) -> Result<ProxyFetcher> {
        let tls = match self.root_store {
            Some(roots) => TlsHandoff::with_root_store(roots)?,
            None => TlsHandoff::with_default_roots()?,
        };

        let mut tunnel_config = self.tunnel_config;
        if tunnel_config.proxy_tls.is_none() {
            tunnel_config.proxy_tls = Some(tls.clone());
        }

        let mut headers = self.headers;
        headers.remove(header::PROXY_AUTHORIZATION);

        Ok(ProxyFetcher::from_inner(Arc::new(Inner {
            connector: proxytun_client::ProxyTunnelConnector::new(tunnel_config),
            tls,
            proxy: self.proxy,
            proxy_env: self.proxy_env,
            user_agent: self
                .user_agent
                .unwrap_or(HeaderValue::from_static(DEFAULT_USER_AGENT)),
            headers,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_authorization_never_stored() {
        let builder = ProxyFetcherBuilder::new()
            .header(header::PROXY_AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="))
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(builder.headers.get(header::PROXY_AUTHORIZATION).is_none());
        assert_eq!(builder.headers.len(), 1);
    }

    #[test]
    fn explicit_proxy_is_kept() {
        let proxy = ProxyEndpoint::parse("proxy.local:3128").expect("endpoint");
        let builder = ProxyFetcherBuilder::new().proxy(proxy.clone());
        assert_eq!(builder.proxy, Some(proxy));
    }
}
