//! Proxy locator parsing
//!
//! Turns `scheme://[user:pass@]host[:port][?noconnect]` into an immutable
//! [`ProxyEndpoint`]. Credentials are percent-decoded and split off here so
//! nothing downstream ever handles the raw locator string again.

use std::fmt;
use std::str::FromStr;

use url::{Host, Url};

use crate::auth::Credentials;
use crate::error::{self, BadScheme, ColonInUsername};

/// Query key marking the legacy no-tunnel mode.
pub const LEGACY_NO_CONNECT_FLAG: &str = "noconnect";

/// How the connector reaches the proxy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyScheme {
    /// Plain TCP to the proxy.
    Http,
    /// TLS to the proxy, then CONNECT inside that session.
    Https,
}

impl ProxyScheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
        }
    }

    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            ProxyScheme::Http => 80,
            ProxyScheme::Https => 443,
        }
    }

    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "http" => Some(ProxyScheme::Http),
            "https" => Some(ProxyScheme::Https),
            _ => None,
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed forward proxy.
///
/// `Display` and `Debug` never include the password; they are safe to log.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    scheme: ProxyScheme,
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    legacy_no_connect: bool,
}

impl ProxyEndpoint {
    /// Endpoint without credentials.
    pub fn new(scheme: ProxyScheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
            credentials: None,
            legacy_no_connect: false,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Parse a proxy locator.
    ///
    /// A locator without `://` is treated as `http://`.
    ///
    /// # Errors
    /// Returns a `MalformedLocator` error for unparseable input, a missing
    /// host, a port of zero, or a scheme other than `http`/`https`.
    pub fn parse(locator: &str) -> crate::Result<Self> {
        let trimmed = locator.trim();
        if trimmed.is_empty() {
            return Err(error::malformed_locator("empty proxy locator"));
        }

        let url = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("http://{trimmed}"))
        }
        .map_err(error::malformed_locator)?;

        let scheme = ProxyScheme::from_scheme(url.scheme())
            .ok_or_else(|| error::malformed_locator(BadScheme))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(error::malformed_locator("proxy locator missing host")),
        };

        let port = url.port().unwrap_or_else(|| scheme.default_port());
        if port == 0 {
            return Err(error::malformed_locator("proxy port must be non-zero"));
        }

        let credentials = if url.username().is_empty() && url.password().is_none() {
            None
        } else {
            let username = urlencoding::decode(url.username()).map_err(error::malformed_locator)?;
            let password = urlencoding::decode(url.password().unwrap_or_default())
                .map_err(error::malformed_locator)?;
            if username.contains(':') {
                return Err(error::malformed_locator(ColonInUsername));
            }
            Some(Credentials::new(username.into_owned(), password.into_owned())?)
        };

        let legacy_no_connect = url
            .query_pairs()
            .any(|(key, _)| key.eq_ignore_ascii_case(LEGACY_NO_CONNECT_FLAG));

        Ok(Self {
            scheme,
            host,
            port,
            credentials,
            legacy_no_connect,
        })
    }

    #[must_use]
    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    /// Host without IPv6 brackets, suitable for socket connection.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn legacy_no_connect(&self) -> bool {
        self.legacy_no_connect
    }

    /// `host:port`, bracketing IPv6 literals.
    #[must_use]
    pub fn authority(&self) -> String {
        format_authority(&self.host, self.port)
    }
}

impl FromStr for ProxyEndpoint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if self.credentials.is_some() {
            f.write_str("***:***@")?;
        }
        f.write_str(&self.authority())?;
        if self.legacy_no_connect {
            write!(f, "?{LEGACY_NO_CONNECT_FLAG}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyEndpoint")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("legacy_no_connect", &self.legacy_no_connect)
            .finish()
    }
}

pub(crate) fn format_authority(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
