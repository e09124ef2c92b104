//! Distance probing against the proximity-search collaborator
//!
//! The core only needs one thing from the service transport: the distance to
//! a target as seen from a given point. This module defines that contract,
//! derives it from a nearby-profiles search, and provides the injected
//! profile repository plus a simulated search for tests and demos.

pub mod distance;
pub mod error;
pub mod mock;
pub mod repository;
pub mod search;

pub use distance::{DistanceProbe, SearchDistanceProbe};
pub use error::{CollaboratorError, ProbeError, ProbeResult};
pub use mock::{SimulatedEntity, SimulatedProximitySearch};
pub use repository::{InMemoryProfileRepository, PendingBlock, ProfileRepository};
pub use search::{NearbyProfile, ProximitySearch, SearchFilters};
