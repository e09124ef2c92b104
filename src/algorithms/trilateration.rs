//! Closed-form three-sphere trilateration
//!
//! Each beacon describes a sphere centred on its vantage point with radius
//! equal to the measured distance. The solver intersects the three spheres in
//! a local orthonormal frame spanned by the vantage points:
//!
//! - `ex` points from the first to the second vantage point
//! - `ey` completes the plane through the third vantage point
//! - `ez = ex × ey` is the plane normal
//!
//! Two intersections exist, one on each side of that plane. Three distances
//! cannot tell them apart, so the solver reports the root on the `+ez` side as
//! [`TrilaterationSolution::location`] and the other one as
//! [`TrilaterationSolution::mirror`]. A fourth measurement settles it, see
//! [`TrilaterationSolver::disambiguate`].

use nalgebra::Vector3;
use thiserror::Error;
use tracing::{debug, warn};

use crate::algorithms::coordinates::{CartesianPoint, CoordinateTransform};
use crate::core::{Beacon, Location, BEACON_COUNT};

/// Why a vantage configuration cannot span a trilateration frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Two vantage points coincide (zero baseline)
    DuplicateVantage,
    /// The three vantage points lie on one line
    Collinear,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degeneracy::DuplicateVantage => write!(f, "duplicate vantage points"),
            Degeneracy::Collinear => write!(f, "collinear vantage points"),
        }
    }
}

/// Trilateration failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Vantage points are duplicate or collinear.
    ///
    /// `measure` is the shortest baseline (km) for duplicates and the sine of
    /// the angle at the first vantage point for collinear triples.
    #[error("degenerate geometry: {kind} (measure {measure:e})")]
    DegenerateGeometry { kind: Degeneracy, measure: f64 },

    /// Spheres miss each other by more than the configured tolerance
    #[error("inconsistent measurements: discriminant {discriminant_km2:.6} km²")]
    InconsistentMeasurements { discriminant_km2: f64 },

    /// A beacon carries a negative or non-finite distance
    #[error("beacon {index} has invalid distance {distance}")]
    InvalidDistance { index: usize, distance: f64 },
}

/// Result of one solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrilaterationSolution {
    /// Intersection on the `+ez` side of the vantage plane
    pub location: Location,
    /// Intersection on the `-ez` side
    pub mirror: Location,
    /// `d1² − x² − y²` before the absolute value is taken (km²).
    /// Negative means the three spheres do not actually meet.
    pub discriminant_km2: f64,
}

impl TrilaterationSolution {
    /// Whether the spheres intersect exactly (up to rounding)
    pub fn is_consistent(&self) -> bool {
        self.discriminant_km2 >= 0.0
    }

    /// How far the spheres miss each other (km), zero when consistent
    pub fn inconsistency_km(&self) -> f64 {
        if self.discriminant_km2 < 0.0 {
            (-self.discriminant_km2).sqrt()
        } else {
            0.0
        }
    }
}

/// Local orthonormal frame spanned by three vantage points
#[derive(Debug, Clone, Copy)]
struct Frame {
    origin: CartesianPoint,
    ex: Vector3<f64>,
    ey: Vector3<f64>,
    ez: Vector3<f64>,
    d: f64,
    i: f64,
    j: f64,
}

/// Three-sphere trilateration engine
#[derive(Debug, Clone)]
pub struct TrilaterationSolver {
    transform: CoordinateTransform,
    /// Baselines shorter than this count as duplicate vantage points (km)
    pub min_baseline_km: f64,
    /// Minimum sine of the angle between `p2 − p1` and `p3 − p1`
    pub collinearity_tolerance: f64,
    /// Reject solves whose spheres miss by more than this (km).
    /// `None` keeps the best-effort clamp.
    pub max_inconsistency_km: Option<f64>,
}

impl Default for TrilaterationSolver {
    fn default() -> Self {
        Self {
            transform: CoordinateTransform::default(),
            min_baseline_km: 1e-6,
            collinearity_tolerance: 1e-3,
            max_inconsistency_km: None,
        }
    }
}

impl TrilaterationSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: CoordinateTransform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Check that three vantage points can span a trilateration frame
    pub fn check_vantage(&self, vantage: &[Location; BEACON_COUNT]) -> Result<(), SolverError> {
        let [p1, p2, p3] = vantage.map(|loc| self.transform.to_cartesian(&loc));
        self.frame(p1, p2, p3).map(|_| ())
    }

    /// Intersect the three beacon spheres.
    ///
    /// Under measurement noise the spheres may not meet; the solver then takes
    /// `sqrt(|d1² − x² − y²|)` and still returns a finite point, reporting the
    /// signed discriminant so callers can see how far off the geometry was.
    pub fn solve(&self, beacons: &[Beacon; BEACON_COUNT]) -> Result<TrilaterationSolution, SolverError> {
        for (index, beacon) in beacons.iter().enumerate() {
            if !beacon.distance_km.is_finite() || beacon.distance_km < 0.0 {
                return Err(SolverError::InvalidDistance {
                    index,
                    distance: beacon.distance_km,
                });
            }
        }

        let [p1, p2, p3] = beacons.map(|b| self.transform.to_cartesian(&b.location));
        let frame = self.frame(p1, p2, p3)?;

        let [r1, r2, r3] = beacons.map(|b| b.distance_km);
        let Frame { d, i, j, .. } = frame;

        let x = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
        let y = (r1 * r1 - r3 * r3 + i * i + j * j) / (2.0 * j) - (i / j) * x;
        let discriminant = r1 * r1 - x * x - y * y;

        if discriminant < 0.0 {
            let miss_km = (-discriminant).sqrt();
            if let Some(limit) = self.max_inconsistency_km {
                if miss_km > limit {
                    return Err(SolverError::InconsistentMeasurements {
                        discriminant_km2: discriminant,
                    });
                }
            }
            warn!(discriminant_km2 = discriminant, miss_km, "beacon spheres do not intersect, clamping");
        }

        let z = discriminant.abs().sqrt();
        let in_plane = frame.origin + frame.ex * x + frame.ey * y;

        let solution = TrilaterationSolution {
            location: self.transform.to_geodetic(&(in_plane + frame.ez * z)),
            mirror: self.transform.to_geodetic(&(in_plane - frame.ez * z)),
            discriminant_km2: discriminant,
        };

        debug!(
            x, y, z,
            location = %solution.location,
            mirror = %solution.mirror,
            "trilateration solved"
        );

        Ok(solution)
    }

    /// Choose between the two roots using a fourth measurement.
    ///
    /// Returns the candidate whose distance to the fourth vantage point best
    /// matches the measured one.
    pub fn disambiguate(&self, solution: &TrilaterationSolution, fourth: &Beacon) -> Location {
        let fourth_p = self.transform.to_cartesian(&fourth.location);
        let residual = |loc: &Location| {
            ((self.transform.to_cartesian(loc) - fourth_p).norm() - fourth.distance_km).abs()
        };

        if residual(&solution.mirror) < residual(&solution.location) {
            solution.mirror
        } else {
            solution.location
        }
    }

    fn frame(&self, p1: CartesianPoint, p2: CartesianPoint, p3: CartesianPoint) -> Result<Frame, SolverError> {
        let shortest = (p2 - p1).norm().min((p3 - p1).norm()).min((p3 - p2).norm());
        if !(shortest >= self.min_baseline_km) {
            return Err(SolverError::DegenerateGeometry {
                kind: Degeneracy::DuplicateVantage,
                measure: shortest,
            });
        }

        let d = (p2 - p1).norm();
        let ex = (p2 - p1) / d;
        let v = p3 - p1;

        // |ex × v| / |v| is the sine of the angle at p1; it also equals |j| / |v|.
        let sine = ex.cross(&v).norm() / v.norm();
        if !(sine >= self.collinearity_tolerance) {
            return Err(SolverError::DegenerateGeometry {
                kind: Degeneracy::Collinear,
                measure: sine,
            });
        }

        let i = ex.dot(&v);
        let perpendicular = v - ex * i;
        let ey = perpendicular / perpendicular.norm();
        let ez = ex.cross(&ey);
        let j = ey.dot(&v);

        Ok(Frame { origin: p1, ex, ey, ez, d, i, j })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn beacons_for(solver: &TrilaterationSolver, vantage: [Location; 3], target: &Location) -> [Beacon; 3] {
        vantage.map(|loc| Beacon {
            location: loc,
            distance_km: solver.transform().chord_distance(&loc, target),
        })
    }

    fn chord(solver: &TrilaterationSolver, a: &Location, b: &Location) -> f64 {
        solver.transform().chord_distance(a, b)
    }

    #[test]
    fn test_exact_distances_recover_target() {
        let solver = TrilaterationSolver::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut solved = 0;

        for _ in 0..500 {
            let reference = Location::new(rng.gen_range(-60.0..60.0), rng.gen_range(-170.0..170.0));
            let mut jitter = || reference.offset(rng.gen_range(-0.05..0.05), rng.gen_range(-0.05..0.05));
            let vantage = [jitter(), jitter(), jitter()];
            let target = reference.offset(rng.gen_range(-0.03..0.03), rng.gen_range(-0.03..0.03));

            if solver.check_vantage(&vantage).is_err() {
                continue;
            }

            let solution = solver.solve(&beacons_for(&solver, vantage, &target)).unwrap();
            let error = chord(&solver, &solution.location, &target).min(chord(&solver, &solution.mirror, &target));
            assert!(error < 1e-4, "target {} missed by {} km", target, error);
            solved += 1;
        }

        assert!(solved > 450);
    }

    #[test]
    fn test_positive_root_convention() {
        let solver = TrilaterationSolver::new();
        // Counter-clockwise seen from outside: ez points away from the Earth's centre
        let vantage = [
            Location::new(-5.0, -5.0),
            Location::new(-5.0, 5.0),
            Location::new(5.0, 0.0),
        ];
        let target = Location::new(1.0, 1.0);

        let solution = solver.solve(&beacons_for(&solver, vantage, &target)).unwrap();
        assert!(solution.is_consistent());
        assert!(chord(&solver, &solution.location, &target) < 1e-6);
        assert!(solver.transform().surface_distance(&solution.mirror, &target) > 0.1);

        // Swapping the last two vantage points flips ez, and with it the reported root
        let swapped = [vantage[0], vantage[2], vantage[1]];
        let solution = solver.solve(&beacons_for(&solver, swapped, &target)).unwrap();
        assert!(chord(&solver, &solution.mirror, &target) < 1e-6);
        assert!(solver.transform().surface_distance(&solution.location, &target) > 0.1);
    }

    #[test]
    fn test_fourth_beacon_disambiguates() {
        let solver = TrilaterationSolver::new();
        let target = Location::new(1.0, 1.0);
        let fourth = Beacon {
            location: Location::new(5.0, 10.0),
            distance_km: chord(&solver, &Location::new(5.0, 10.0), &target),
        };

        let vantage = [
            Location::new(-5.0, -5.0),
            Location::new(5.0, 0.0),
            Location::new(-5.0, 5.0),
        ];
        let solution = solver.solve(&beacons_for(&solver, vantage, &target)).unwrap();
        let chosen = solver.disambiguate(&solution, &fourth);

        assert_eq!(chosen, solution.mirror);
        assert!(chord(&solver, &chosen, &target) < 1e-6);
    }

    #[test]
    fn test_duplicate_vantage_is_degenerate() {
        let solver = TrilaterationSolver::new();
        let a = Location::new(37.7749, -122.4194);
        let beacons = [
            Beacon { location: a, distance_km: 0.2 },
            Beacon { location: a, distance_km: 0.2 },
            Beacon { location: a.offset(0.002, 0.001), distance_km: 0.3 },
        ];

        match solver.solve(&beacons) {
            Err(SolverError::DegenerateGeometry { kind, measure }) => {
                assert_eq!(kind, Degeneracy::DuplicateVantage);
                assert!(measure < 1e-6);
            }
            other => panic!("expected duplicate vantage error, got {:?}", other),
        }
    }

    #[test]
    fn test_great_circle_vantage_is_collinear() {
        let solver = TrilaterationSolver::new();

        let meridian = [
            Location::new(37.77, -122.4194),
            Location::new(37.78, -122.4194),
            Location::new(37.79, -122.4194),
        ];
        let equator = [
            Location::new(0.0, 10.000),
            Location::new(0.0, 10.004),
            Location::new(0.0, 10.002),
        ];

        for vantage in [meridian, equator] {
            let beacons = vantage.map(|loc| Beacon { location: loc, distance_km: 1.0 });
            match solver.solve(&beacons) {
                Err(SolverError::DegenerateGeometry { kind, .. }) => assert_eq!(kind, Degeneracy::Collinear),
                other => panic!("expected collinear error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_inconsistent_geometry_is_clamped() {
        let solver = TrilaterationSolver::new();
        let reference = Location::new(37.7749, -122.4194);
        let vantage = [reference, reference.offset(0.01, 0.0), reference.offset(0.0, 0.01)];

        // Spheres far too small to meet
        let beacons = vantage.map(|loc| Beacon { location: loc, distance_km: 0.001 });
        let solution = solver.solve(&beacons).unwrap();

        assert!(!solution.is_consistent());
        assert!(solution.inconsistency_km() > 0.1);
        assert!(solution.location.latitude.is_finite());
        assert!(solution.location.longitude.is_finite());
        // With z clamped the result stays near the vantage triangle
        assert!(solver.transform().surface_distance(&solution.location, &reference) < 2.0);

        let strict = TrilaterationSolver {
            max_inconsistency_km: Some(0.01),
            ..TrilaterationSolver::new()
        };
        assert!(matches!(
            strict.solve(&beacons),
            Err(SolverError::InconsistentMeasurements { discriminant_km2 }) if discriminant_km2 < 0.0
        ));
    }

    #[test]
    fn test_zero_distance_is_vantage_point() {
        let solver = TrilaterationSolver::new();
        let reference = Location::new(51.5074, -0.1278);
        let vantage = [reference, reference.offset(0.003, 0.001), reference.offset(-0.001, 0.004)];

        let solution = solver.solve(&beacons_for(&solver, vantage, &reference)).unwrap();
        assert!(chord(&solver, &solution.location, &reference) < 1e-5);
    }

    #[test]
    fn test_invalid_inputs() {
        let solver = TrilaterationSolver::new();
        let reference = Location::new(37.7749, -122.4194);
        let mut beacons = [reference, reference.offset(0.003, 0.0), reference.offset(0.0, 0.003)]
            .map(|loc| Beacon { location: loc, distance_km: 0.2 });

        beacons[1].distance_km = -1.0;
        assert_eq!(
            solver.solve(&beacons),
            Err(SolverError::InvalidDistance { index: 1, distance: -1.0 })
        );
    }
}
