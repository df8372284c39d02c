pub mod classification;
pub mod constructors;
pub mod helpers;
pub mod types;

pub use constructors::*;
pub use helpers::{AlreadyResolved, BadScheme, ColonInUsername, LegacyNoConnect};
pub use types::{Error, Kind, Result};
