use std::fmt;

use zeroize::Zeroizing;

use crate::error::{self, ColonInUsername};

/// Username/password pair for the proxy hop.
///
/// `Debug` never prints the password, and the password buffer is zeroed when
/// the value is dropped. The username never contains `:`, so the Basic
/// `user:pass` join is unambiguous.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// # Errors
    /// Returns a builder error when `username` contains `:`.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> crate::Result<Self> {
        let username = username.into();
        let password = Zeroizing::new(password.into());
        if username.contains(':') {
            return Err(error::builder(ColonInUsername));
        }
        Ok(Self { username, password })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
