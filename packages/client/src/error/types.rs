use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `proxytun_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and usage errors raised before any tunnel I/O happens.
///
/// Failures of a tunnel attempt itself are not represented here; they are
/// reported through [`crate::TunnelOutcome::Failed`].
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid builder input (target host/port, header values).
    Builder,
    /// A proxy locator string could not be parsed.
    MalformedLocator,
    /// A recognised but unsupported configuration, such as the legacy no-connect mode.
    Unsupported,
    /// A tunnel state machine was driven after it resolved.
    Spent,
    /// TLS client configuration or server name errors.
    Tls,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub(crate) fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("proxytun_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.inner.kind {
            Kind::Builder => "builder error",
            Kind::MalformedLocator => "malformed proxy locator",
            Kind::Unsupported => "unsupported proxy configuration",
            Kind::Spent => "tunnel attempt already resolved",
            Kind::Tls => "tls configuration error",
        };
        match self.inner.source {
            Some(ref source) => write!(f, "{prefix}: {source}"),
            None => f.write_str(prefix),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
