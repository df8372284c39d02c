//! Socket side of tunnel establishment: the async connector and the stream
//! it hands back.

mod connector;
mod stream;

pub use connector::ProxyTunnelConnector;
pub use stream::{ProxyStream, TunnelStream};
