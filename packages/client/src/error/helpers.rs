use std::fmt;

/// A marker type to indicate that a state machine was already resolved.
#[derive(Debug)]
pub struct AlreadyResolved;

impl fmt::Display for AlreadyResolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("tunnel state machine already resolved")
    }
}

impl std::error::Error for AlreadyResolved {}

/// A marker type to indicate that a locator used the legacy no-connect flag.
#[derive(Debug)]
pub struct LegacyNoConnect;

impl fmt::Display for LegacyNoConnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("legacy no-connect proxy mode is not supported; remove the `noconnect` flag")
    }
}

impl std::error::Error for LegacyNoConnect {}

/// A marker type to indicate that a locator scheme is not a supported proxy scheme.
#[derive(Debug)]
pub struct BadScheme;

impl fmt::Display for BadScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bad scheme")
    }
}

impl std::error::Error for BadScheme {}

/// A marker type to indicate that a Basic username contained a colon.
#[derive(Debug)]
pub struct ColonInUsername;

impl fmt::Display for ColonInUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("proxy username must not contain ':'")
    }
}

impl std::error::Error for ColonInUsername {}
