//! Proximity-search collaborator interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Location, TargetId};
use crate::probe::error::CollaboratorError;

/// One entry of a proximity-search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyProfile {
    pub id: TargetId,
    /// Distance from the search centre (km); `None` when the profile hides it
    pub distance_km: Option<f64>,
}

impl NearbyProfile {
    pub fn new(id: impl Into<TargetId>, distance_km: f64) -> Self {
        Self {
            id: id.into(),
            distance_km: Some(distance_km),
        }
    }

    pub fn hidden(id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            distance_km: None,
        }
    }
}

/// Filters forwarded verbatim to the collaborator alongside the search centre
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Only profiles currently online
    pub online_only: bool,
    /// Only profiles with a photo
    pub photo_only: bool,
    /// Result page size requested from the service
    pub page_size: Option<u32>,
}

/// Nearby-entity search exposed by the service transport.
///
/// Results are bounded by the collaborator's own search radius and result
/// cap. Implementations own their timeouts.
#[async_trait]
pub trait ProximitySearch: Send + Sync {
    async fn nearby(
        &self,
        center: Location,
        filters: &SearchFilters,
    ) -> Result<Vec<NearbyProfile>, CollaboratorError>;
}
