//! Common API types and data structures

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::algorithms::trilateration::{Degeneracy, SolverError};
use crate::core::{Beacon, Location, TargetId, BEACON_COUNT};
use crate::probe::error::CollaboratorError;

/// Result type for pinpoint operations
pub type PinpointResult<T> = Result<T, PinpointError>;

/// Pinpoint failures. Every variant ends the call; retrying is up to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PinpointError {
    /// At least one probe could not see the target
    #[error("target {target} not observable from vantage point {vantage_index}")]
    TargetNotObservable { target: TargetId, vantage_index: usize },

    /// Vantage points were duplicate or collinear
    #[error("degenerate vantage geometry: {kind} (measure {measure:e})")]
    DegenerateGeometry { kind: Degeneracy, measure: f64 },

    /// Spheres missed each other beyond the configured tolerance
    #[error("inconsistent measurements: spheres miss by {miss_km:.4} km")]
    InconsistentMeasurements { miss_km: f64 },

    /// A probe returned a distance the solver cannot use
    #[error("invalid distance {distance} from vantage point {vantage_index}")]
    InvalidMeasurement { vantage_index: usize, distance: f64 },

    /// Reference or vantage coordinates outside the valid lat/lon range
    #[error("invalid location {location}")]
    InvalidLocation { location: Location },

    /// Transport failure from the proximity-search collaborator, unchanged
    #[error("proximity search failed: {0}")]
    CollaboratorFailure(#[from] CollaboratorError),
}

impl From<SolverError> for PinpointError {
    fn from(error: SolverError) -> Self {
        match error {
            SolverError::DegenerateGeometry { kind, measure } => PinpointError::DegenerateGeometry { kind, measure },
            SolverError::InconsistentMeasurements { discriminant_km2 } => PinpointError::InconsistentMeasurements {
                miss_km: (-discriminant_km2).max(0.0).sqrt(),
            },
            SolverError::InvalidDistance { index, distance } => PinpointError::InvalidMeasurement {
                vantage_index: index,
                distance,
            },
        }
    }
}

impl PinpointError {
    /// Whether a fresh call (new random vantage points) can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PinpointError::TargetNotObservable { .. }
            | PinpointError::DegenerateGeometry { .. }
            | PinpointError::InconsistentMeasurements { .. } => true,
            PinpointError::CollaboratorFailure(error) => match error {
                CollaboratorError::Timeout { .. } | CollaboratorError::Transport(_) => true,
                CollaboratorError::Rejected { status, .. } => *status >= 500 || *status == 429,
            },
            PinpointError::InvalidMeasurement { .. } | PinpointError::InvalidLocation { .. } => false,
        }
    }
}

/// Pinpoint result with the measurements behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fix {
    /// Correlates the fix with its log records
    pub request_id: Uuid,
    pub target: TargetId,
    /// Reported location: the `+ez` root, or the root chosen by the fourth probe
    pub location: Location,
    /// The other sphere intersection
    pub mirror: Location,
    pub beacons: [Beacon; BEACON_COUNT],
    /// Fourth measurement used for disambiguation, if any
    pub fourth: Option<Beacon>,
    /// Signed `d1² − x² − y²` (km²); negative when the clamp was applied
    pub discriminant_km2: f64,
}

impl Fix {
    pub fn was_clamped(&self) -> bool {
        self.discriminant_km2 < 0.0
    }

    pub fn disambiguated(&self) -> bool {
        self.fourth.is_some()
    }
}
