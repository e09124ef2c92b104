//! Randomized vantage point generation

use rand::Rng;
use tracing::{debug, warn};

use crate::algorithms::trilateration::{SolverError, TrilaterationSolver};
use crate::core::{Location, BEACON_COUNT, DEFAULT_JITTER_DEGREES};

/// Draws vantage points inside a jitter box around a reference location
#[derive(Debug, Clone)]
pub struct VantagePointGenerator {
    /// Half-width of the jitter box in latitude and longitude (degrees)
    pub jitter_degrees: f64,
    /// Redraw budget for [`Self::generate_triple`]
    pub max_redraws: u32,
    /// Geometry checks shared with the solver
    solver: TrilaterationSolver,
}

impl Default for VantagePointGenerator {
    fn default() -> Self {
        Self {
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            max_redraws: 16,
            solver: TrilaterationSolver::default(),
        }
    }
}

impl VantagePointGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose degeneracy check matches `solver`
    pub fn with_solver(solver: TrilaterationSolver) -> Self {
        Self {
            solver,
            ..Default::default()
        }
    }

    /// `count` i.i.d. points, each offset from `reference` by uniform
    /// `[-jitter, +jitter)` degrees in latitude and longitude.
    ///
    /// Nothing here prevents a degenerate draw.
    pub fn generate<R: Rng + ?Sized>(
        reference: &Location,
        count: usize,
        jitter_degrees: f64,
        rng: &mut R,
    ) -> Vec<Location> {
        (0..count)
            .map(|_| reference.offset(jitter(rng, jitter_degrees), jitter(rng, jitter_degrees)))
            .collect()
    }

    /// Three vantage points that span a usable trilateration frame.
    ///
    /// Duplicate or near-collinear draws are rejected and redrawn; running out
    /// of redraws reports the last degeneracy.
    pub fn generate_triple<R: Rng + ?Sized>(
        &self,
        reference: &Location,
        rng: &mut R,
    ) -> Result<[Location; BEACON_COUNT], SolverError> {
        let mut attempt = 0;
        loop {
            let triple: [Location; BEACON_COUNT] = std::array::from_fn(|_| self.generate_one(reference, rng));

            match self.solver.check_vantage(&triple) {
                Ok(()) => {
                    debug!(attempt, ?triple, "vantage points drawn");
                    return Ok(triple);
                }
                Err(err) if attempt < self.max_redraws => {
                    warn!(attempt, error = %err, "degenerate vantage draw, redrawing");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One extra point for root disambiguation
    pub fn generate_one<R: Rng + ?Sized>(&self, reference: &Location, rng: &mut R) -> Location {
        reference.offset(jitter(rng, self.jitter_degrees), jitter(rng, self.jitter_degrees))
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}
