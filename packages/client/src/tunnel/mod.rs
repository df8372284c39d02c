//! CONNECT tunnel protocol: request description, reply parsing, failure
//! classification and the per-attempt state machine.

mod classify;
mod machine;
mod outcome;
mod request;
mod response;

pub use classify::{ConnectFailure, ErrorKind, Signal, TunnelFailure, TunnelFault, classify};
pub use machine::{Resolution, Step, TunnelMachine, TunnelState};
pub use outcome::{Established, TunnelOutcome};
pub use request::{TargetAddr, TunnelRequest};
pub use response::ProxyResponse;
