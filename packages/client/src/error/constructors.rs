use super::types::{Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a builder error.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a proxy locator that failed to parse.
pub fn malformed_locator<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::MalformedLocator).with(e.into())
}

/// Creates an `Error` for a configuration that is parsed but not supported.
pub fn unsupported<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Unsupported).with(e.into())
}

/// Creates an `Error` for a transition attempted on a resolved state machine.
pub fn spent() -> Error {
    Error::new(Kind::Spent).with(super::helpers::AlreadyResolved)
}

/// Creates an `Error` for TLS configuration failures.
pub fn tls<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Tls).with(e.into())
}
