//! Forward proxy configuration
//!
//! Parsing of proxy locators into [`ProxyEndpoint`] values, `NO_PROXY`
//! bypass rules, and the explicit environment snapshot [`ProxyEnv`].

mod endpoint;
mod env;
mod no_proxy;

pub use endpoint::{LEGACY_NO_CONNECT_FLAG, ProxyEndpoint, ProxyScheme};
pub(crate) use endpoint::format_authority;
pub use env::ProxyEnv;
pub use no_proxy::NoProxy;
