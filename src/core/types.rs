//! Core data types for the pinpoint system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic coordinate in decimal degrees, treated as lying on a perfect sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Same location shifted by the given deltas (degrees)
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self {
            latitude: self.latitude + dlat,
            longitude: self.longitude + dlon,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Vantage point paired with the measured distance to the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub location: Location,
    /// Measured distance to the target (km)
    pub distance_km: f64,
}

impl Beacon {
    /// Build a beacon, rejecting negative or non-finite distances
    pub fn new(location: Location, distance_km: f64) -> Option<Self> {
        if distance_km.is_finite() && distance_km >= 0.0 {
            Some(Self { location, distance_km })
        } else {
            None
        }
    }
}

/// Opaque identifier of the entity being pinpointed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        TargetId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        TargetId(id.to_string())
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        TargetId(id)
    }
}

// The service hands out numeric profile ids.
impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        TargetId(id.to_string())
    }
}
