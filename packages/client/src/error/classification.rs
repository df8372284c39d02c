use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error is from a builder.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.kind(), Kind::Builder)
    }

    /// Returns true if a proxy locator string failed to parse.
    #[must_use]
    pub fn is_malformed_locator(&self) -> bool {
        matches!(self.kind(), Kind::MalformedLocator)
    }

    /// Returns true if the configuration was understood but is not supported.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind(), Kind::Unsupported)
    }

    /// Returns true if a resolved tunnel attempt was driven again.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        matches!(self.kind(), Kind::Spent)
    }

    /// Returns true if the error came from TLS configuration.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self.kind(), Kind::Tls)
    }
}
