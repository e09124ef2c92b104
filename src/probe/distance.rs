//! Distance probe contract and its proximity-search implementation

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::core::{Location, TargetId};
use crate::probe::error::{ProbeError, ProbeResult};
use crate::probe::repository::ProfileRepository;
use crate::probe::search::{ProximitySearch, SearchFilters};
use crate::utils::config::PinpointConfig;

/// "From `vantage`, how far away is `target`, if visible at all?"
///
/// Probes are read-only and independent; the orchestrator runs several
/// concurrently against one instance.
#[async_trait]
pub trait DistanceProbe: Send + Sync {
    /// Measured distance (km), or [`ProbeError::NotObservable`]
    async fn probe(&self, vantage: Location, target: &TargetId) -> ProbeResult<f64>;
}

#[async_trait]
impl<P: DistanceProbe + ?Sized> DistanceProbe for Arc<P> {
    async fn probe(&self, vantage: Location, target: &TargetId) -> ProbeResult<f64> {
        (**self).probe(vantage, target).await
    }
}

/// Probe derived from a proximity search: search around the vantage point and
/// pick the target out of the result list.
pub struct SearchDistanceProbe<S, R> {
    search: S,
    repository: Arc<R>,
    filters: SearchFilters,
}

impl<S, R> SearchDistanceProbe<S, R>
where
    S: ProximitySearch,
    R: ProfileRepository,
{
    pub fn new(search: S, repository: Arc<R>) -> Self {
        Self {
            search,
            repository,
            filters: SearchFilters::default(),
        }
    }

    /// Probe searching with the filters from `config.search`
    pub fn from_config(search: S, repository: Arc<R>, config: &PinpointConfig) -> Self {
        Self::new(search, repository).with_filters(config.search.clone())
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}

#[async_trait]
impl<S, R> DistanceProbe for SearchDistanceProbe<S, R>
where
    S: ProximitySearch,
    R: ProfileRepository,
{
    async fn probe(&self, vantage: Location, target: &TargetId) -> ProbeResult<f64> {
        let results = self.search.nearby(vantage, &self.filters).await?;
        trace!(%vantage, count = results.len(), "proximity search returned");

        let mut found = None;
        for profile in results.iter().filter(|p| !self.repository.is_blocked(&p.id)) {
            self.repository.remember(profile);
            if &profile.id == target {
                found = Some(profile);
            }
        }

        let distance = found
            .and_then(|p| p.distance_km)
            .ok_or_else(|| ProbeError::NotObservable { target: target.clone() })?;

        if !distance.is_finite() || distance < 0.0 {
            return Err(ProbeError::InvalidDistance {
                target: target.clone(),
                distance,
            });
        }

        debug!(%vantage, target_id = %target, distance_km = distance, "target observed");
        Ok(distance)
    }
}
