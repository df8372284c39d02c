//! Proxy hop credentials and their `Basic` wire encoding
//!
//! Credentials live in memory only as long as the endpoint that owns them and
//! are wiped on drop. The encoded header value is produced fresh for every
//! tunnel attempt and never leaves the CONNECT request builder.

mod basic;
mod credentials;

pub use basic::{CredentialCodec, PROXY_AUTHORIZATION, ProxyAuthorization};
pub use credentials::Credentials;
