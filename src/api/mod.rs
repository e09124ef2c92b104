//! Pinpoint API
//!
//! The single operation exposed to callers is
//! [`PinpointOrchestrator::pinpoint`]; the rest of this module is its result
//! and error types.

pub mod pinpoint;
pub mod types;

pub use pinpoint::PinpointOrchestrator;
pub use types::{Fix, PinpointError, PinpointResult};
