//! Rustls-backed TLS collaborator

mod handoff;

pub use handoff::TlsHandoff;
pub use rustls::RootCertStore;
