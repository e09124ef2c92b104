//! Physical constants and system parameters

/// Mean Earth radius used by the spherical model (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of beacons consumed by one trilateration solve
pub const BEACON_COUNT: usize = 3;

/// Default half-width of the vantage jitter box (degrees, roughly ±500 m)
pub const DEFAULT_JITTER_DEGREES: f64 = 0.005;
