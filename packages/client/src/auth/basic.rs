use std::fmt;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use zeroize::Zeroizing;

use super::Credentials;
use crate::error::{self, ColonInUsername};

/// Header name used for proxy-hop authentication.
pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";

/// Encoded `Basic` credential value, e.g. `Basic dXNlcjpwYXNz`.
///
/// Wiped on drop and redacted from `Debug`.
pub struct ProxyAuthorization(Zeroizing<String>);

impl ProxyAuthorization {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProxyAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxyAuthorization(<redacted>)")
    }
}

impl PartialEq for ProxyAuthorization {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Eq for ProxyAuthorization {}

/// Deterministic `user:pass` → `Basic base64(user:pass)` codec.
pub struct CredentialCodec;

impl CredentialCodec {
    /// Encode a username/password pair.
    ///
    /// Pure: identical inputs always yield identical output.
    ///
    /// # Errors
    /// Returns a builder error when `username` contains `:`, since the joined
    /// `user:pass` would be ambiguous.
    pub fn encode(username: &str, password: &str) -> crate::Result<ProxyAuthorization> {
        if username.contains(':') {
            return Err(error::builder(ColonInUsername));
        }
        Ok(Self::join(username, password))
    }

    #[must_use]
    pub fn encode_credentials(credentials: &Credentials) -> ProxyAuthorization {
        Self::join(credentials.username(), credentials.password())
    }

    fn join(username: &str, password: &str) -> ProxyAuthorization {
        let plain = Zeroizing::new(format!("{username}:{password}"));
        let mut value = Zeroizing::new(String::with_capacity(6 + plain.len().div_ceil(3) * 4));
        value.push_str("Basic ");
        BASE64_STANDARD.encode_string(plain.as_bytes(), &mut *value);
        ProxyAuthorization(value)
    }

    /// Decode a `Basic` header value back into its user and password.
    ///
    /// Returns `None` for anything that is not a well-formed `Basic` value.
    #[must_use]
    pub fn decode(header: &str) -> Option<Credentials> {
        let encoded = header.strip_prefix("Basic ")?.trim();
        let decoded = Zeroizing::new(BASE64_STANDARD.decode(encoded).ok()?);
        let plain = std::str::from_utf8(&decoded).ok()?;
        let (user, pass) = plain.split_once(':')?;
        Credentials::new(user, pass).ok()
    }
}
