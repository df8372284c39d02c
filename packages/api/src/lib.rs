//! Proxytun public API
//!
//! Fetch `https://` URLs through an HTTP forward proxy. The proxy hop is a
//! `CONNECT` tunnel from [`proxytun_client`]; TLS runs end-to-end with the
//! origin over it.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

mod builder;
mod error;
mod fetcher;
mod response;

pub use builder::ProxyFetcherBuilder;
pub use error::{FetchError, Result};
pub use fetcher::ProxyFetcher;
pub use response::FetchResponse;

// Re-export the types needed to configure a fetcher
pub use proxytun_client::{
    ConnectFailure, Credentials, ErrorKind, NoProxy, ProxyEndpoint, ProxyEnv, RootCertStore,
    TunnelConfig, TunnelFailure, TunnelFault,
};
