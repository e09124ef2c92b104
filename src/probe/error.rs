//! Probe and collaborator error types

use thiserror::Error;

use crate::core::TargetId;

/// Transport-level failure reported by the proximity-search collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// No response within the transport's own timeout
    #[error("proximity search timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The service answered with an error status
    #[error("proximity search rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Connection or decoding failure
    #[error("proximity search transport error: {0}")]
    Transport(String),
}

/// Why a distance probe produced no measurement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Target missing from the search results: out of range, hidden or blocked
    #[error("target {target} not observable from this vantage point")]
    NotObservable { target: TargetId },

    /// Collaborator reported a distance the solver cannot use
    #[error("target {target} reported with invalid distance {distance}")]
    InvalidDistance { target: TargetId, distance: f64 },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    /// Whether the target was simply not visible, as opposed to a failure
    pub fn is_not_observable(&self) -> bool {
        matches!(self, ProbeError::NotObservable { .. })
    }
}
