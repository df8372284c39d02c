//! Connector configuration

mod tunnel;

pub use tunnel::TunnelConfig;
