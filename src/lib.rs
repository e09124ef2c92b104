//! Distance-oracle geolocation
//!
//! Recovers the coordinate of a target from three "how far is the target
//! from here" measurements taken at randomized vantage points, using
//! spherical trilateration.

pub mod core;
pub mod algorithms;
pub mod probe;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Beacon, Location, TargetId, EARTH_RADIUS_KM};
pub use crate::algorithms::{
    CoordinateTransform, Degeneracy, SolverError, TrilaterationSolution, TrilaterationSolver,
    VantagePointGenerator,
};
pub use crate::probe::{
    CollaboratorError, DistanceProbe, InMemoryProfileRepository, NearbyProfile, ProbeError,
    ProfileRepository, ProximitySearch, SearchDistanceProbe, SearchFilters, SimulatedProximitySearch,
};
pub use crate::api::{Fix, PinpointError, PinpointOrchestrator, PinpointResult};
pub use crate::utils::{ConfigError, PinpointConfig};
