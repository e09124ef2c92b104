//! Pinpoint orchestration
//!
//! One call draws vantage points around a reference location, probes the
//! target's distance from each of them concurrently, and trilaterates. The
//! join is all-or-nothing: the solver needs all three beacons, so the first
//! failed probe fails the call and the probes still in flight are dropped.
//! The optional fourth probe only breaks the tie between the two roots; when
//! it fails the call keeps the `+ez` root.

use futures::future::{try_join, try_join_all};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::algorithms::trilateration::TrilaterationSolver;
use crate::algorithms::vantage::VantagePointGenerator;
use crate::api::types::{Fix, PinpointError, PinpointResult};
use crate::core::{Beacon, Location, TargetId, BEACON_COUNT};
use crate::probe::distance::DistanceProbe;
use crate::probe::error::ProbeError;
use crate::utils::config::PinpointConfig;

/// Drives vantage generation, concurrent probing and the solve
pub struct PinpointOrchestrator<P> {
    probe: P,
    solver: TrilaterationSolver,
    generator: VantagePointGenerator,
    /// Take a fourth measurement to choose between the two roots
    disambiguation_probe: bool,
}

impl<P: DistanceProbe> PinpointOrchestrator<P> {
    pub fn new(probe: P) -> Self {
        Self::with_config(probe, &PinpointConfig::default())
    }

    /// Solver and generator settings come from `config`. Search filters belong
    /// to the probe; see [`SearchDistanceProbe::from_config`].
    ///
    /// [`SearchDistanceProbe::from_config`]: crate::probe::SearchDistanceProbe::from_config
    pub fn with_config(probe: P, config: &PinpointConfig) -> Self {
        Self {
            probe,
            solver: config.solver(),
            generator: config.generator(),
            disambiguation_probe: config.disambiguation_probe,
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Locate `target` using vantage points drawn around `reference`
    pub async fn pinpoint(&self, reference: Location, target: &TargetId) -> PinpointResult<Location> {
        self.pinpoint_fix(reference, target).await.map(|fix| fix.location)
    }

    /// Like [`Self::pinpoint`], returning the beacons and solver diagnostics too
    pub async fn pinpoint_fix(&self, reference: Location, target: &TargetId) -> PinpointResult<Fix> {
        if !reference.is_valid() {
            return Err(PinpointError::InvalidLocation { location: reference });
        }

        // ThreadRng is not Send; keep it out of the awaiting part.
        let (vantage, fourth) = {
            let mut rng = rand::thread_rng();
            let vantage = self.generator.generate_triple(&reference, &mut rng)?;
            let fourth = self
                .disambiguation_probe
                .then(|| self.generator.generate_one(&reference, &mut rng));
            (vantage, fourth)
        };

        self.pinpoint_from(vantage, fourth, target).await
    }

    /// Run the probe-and-solve flow on caller-chosen vantage points
    pub async fn pinpoint_from(
        &self,
        vantage: [Location; BEACON_COUNT],
        fourth: Option<Location>,
        target: &TargetId,
    ) -> PinpointResult<Fix> {
        let request_id = Uuid::new_v4();
        let span = info_span!("pinpoint", %request_id, target_id = %target);

        let result = self.execute(request_id, vantage, fourth, target).instrument(span.clone()).await;
        if let Err(err) = &result {
            span.in_scope(|| warn!(error = %err, retryable = err.is_retryable(), "pinpoint failed"));
        }
        result
    }

    async fn execute(
        &self,
        request_id: Uuid,
        vantage: [Location; BEACON_COUNT],
        fourth: Option<Location>,
        target: &TargetId,
    ) -> PinpointResult<Fix> {
        if let Some(&location) = vantage.iter().chain(fourth.iter()).find(|loc| !loc.is_valid()) {
            return Err(PinpointError::InvalidLocation { location });
        }
        // Reject bad geometry before spending any probes on it
        self.solver.check_vantage(&vantage)?;
        debug!(?vantage, ?fourth, "dispatching distance probes");

        let required = vantage.iter().enumerate().map(|(index, &point)| async move {
            self.probe
                .probe(point, target)
                .await
                .map_err(|err| probe_failure(err, index))
        });
        let tie_breaker = async {
            let Some(point) = fourth else {
                return Ok(None);
            };
            let beacon = match self.probe.probe(point, target).await {
                Ok(distance) => Beacon::new(point, distance),
                Err(err) if err.is_not_observable() => {
                    debug!(%point, "target not observable from disambiguation point");
                    None
                }
                Err(err) => {
                    warn!(%point, error = %err, "disambiguation probe failed");
                    None
                }
            };
            Ok::<_, PinpointError>(beacon)
        };
        let (distances, fourth) = try_join(try_join_all(required), tie_breaker).await?;

        let beacon = |index: usize| {
            Beacon::new(vantage[index], distances[index]).ok_or(PinpointError::InvalidMeasurement {
                vantage_index: index,
                distance: distances[index],
            })
        };
        let beacons = [beacon(0)?, beacon(1)?, beacon(2)?];

        let solution = self.solver.solve(&beacons)?;
        let location = match &fourth {
            Some(extra) => self.solver.disambiguate(&solution, extra),
            None => solution.location,
        };

        info!(
            %location,
            discriminant_km2 = solution.discriminant_km2,
            disambiguated = fourth.is_some(),
            "target pinpointed"
        );

        Ok(Fix {
            request_id,
            target: target.clone(),
            location,
            mirror: if location == solution.location { solution.mirror } else { solution.location },
            beacons,
            fourth,
            discriminant_km2: solution.discriminant_km2,
        })
    }
}

fn probe_failure(error: ProbeError, vantage_index: usize) -> PinpointError {
    match error {
        ProbeError::NotObservable { target } => PinpointError::TargetNotObservable { target, vantage_index },
        ProbeError::InvalidDistance { distance, .. } => PinpointError::InvalidMeasurement { vantage_index, distance },
        ProbeError::Collaborator(error) => PinpointError::CollaboratorFailure(error),
    }
}
