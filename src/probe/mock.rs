//! Simulated proximity search for testing and development

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::algorithms::coordinates::CoordinateTransform;
use crate::core::{Location, TargetId};
use crate::probe::error::CollaboratorError;
use crate::probe::search::{NearbyProfile, ProximitySearch, SearchFilters};

/// Entity placed in the simulated world
#[derive(Debug, Clone)]
pub struct SimulatedEntity {
    pub id: TargetId,
    pub location: Location,
    /// Listed without a distance
    pub hide_distance: bool,
}

/// In-process stand-in for the service's nearby search.
///
/// Reports chord distances, i.e. exactly the distance model the solver
/// assumes, so solves against it are limited only by rounding.
pub struct SimulatedProximitySearch {
    transform: CoordinateTransform,
    entities: Vec<SimulatedEntity>,
    /// Entities farther than this from the centre are not listed (km)
    search_radius_km: f64,
    /// Result cap, nearest first
    max_results: usize,
    /// Error returned by every call while set
    failure: Mutex<Option<CollaboratorError>>,
    /// Centres of all searches issued so far
    searches: Mutex<Vec<Location>>,
}

impl Default for SimulatedProximitySearch {
    fn default() -> Self {
        Self {
            transform: CoordinateTransform::default(),
            entities: Vec::new(),
            search_radius_km: 5.0,
            max_results: 50,
            failure: Mutex::new(None),
            searches: Mutex::new(Vec::new()),
        }
    }
}

impl SimulatedProximitySearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, id: impl Into<TargetId>, location: Location) -> Self {
        self.entities.push(SimulatedEntity {
            id: id.into(),
            location,
            hide_distance: false,
        });
        self
    }

    pub fn with_hidden_entity(mut self, id: impl Into<TargetId>, location: Location) -> Self {
        self.entities.push(SimulatedEntity {
            id: id.into(),
            location,
            hide_distance: true,
        });
        self
    }

    pub fn with_search_radius(mut self, radius_km: f64) -> Self {
        self.search_radius_km = radius_km;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Make every following search fail (or succeed again with `None`)
    pub fn set_failure(&self, failure: Option<CollaboratorError>) {
        *self.failure.lock() = failure;
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().len()
    }

    pub fn search_centers(&self) -> Vec<Location> {
        self.searches.lock().clone()
    }
}

#[async_trait]
impl ProximitySearch for SimulatedProximitySearch {
    async fn nearby(
        &self,
        center: Location,
        filters: &SearchFilters,
    ) -> Result<Vec<NearbyProfile>, CollaboratorError> {
        self.searches.lock().push(center);

        if let Some(failure) = self.failure.lock().clone() {
            return Err(failure);
        }

        let mut in_range: Vec<(f64, &SimulatedEntity)> = self
            .entities
            .iter()
            .map(|e| (self.transform.chord_distance(&center, &e.location), e))
            .filter(|(distance, _)| *distance <= self.search_radius_km)
            .collect();
        in_range.sort_by(|a, b| a.0.total_cmp(&b.0));

        let cap = filters
            .page_size
            .map(|size| (size as usize).min(self.max_results))
            .unwrap_or(self.max_results);

        let profiles: Vec<NearbyProfile> = in_range
            .into_iter()
            .take(cap)
            .map(|(distance, e)| NearbyProfile {
                id: e.id.clone(),
                distance_km: (!e.hide_distance).then_some(distance),
            })
            .collect();

        trace!(%center, count = profiles.len(), "simulated search");
        Ok(profiles)
    }
}
