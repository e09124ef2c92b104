//! Core positioning algorithms

pub mod coordinates;
pub mod trilateration;
pub mod vantage;

pub use coordinates::{CartesianPoint, CoordinateTransform};
pub use trilateration::{Degeneracy, SolverError, TrilaterationSolution, TrilaterationSolver};
pub use vantage::VantagePointGenerator;
