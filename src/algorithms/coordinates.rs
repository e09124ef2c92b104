//! Spherical coordinate transformations
//!
//! Geodetic coordinates are projected onto a sphere of fixed radius so the
//! trilateration algebra can work in plain Cartesian space. This is an
//! approximation: the spherical model is systematically off from the WGS84
//! ellipsoid by up to roughly 0.5% in distance. That is fine at city-block
//! precision and wrong for survey-grade work.

use nalgebra::Vector3;

use crate::core::{Location, EARTH_RADIUS_KM};

/// Cartesian point on (or near) the model sphere, in kilometres
pub type CartesianPoint = Vector3<f64>;

/// Geodetic <-> Cartesian transform on an idealized sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    /// Sphere radius (km)
    radius_km: f64,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self {
            radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl CoordinateTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform on a sphere of a custom radius
    pub fn with_radius(radius_km: f64) -> Self {
        Self { radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Project a geodetic location onto the sphere
    pub fn to_cartesian(&self, loc: &Location) -> CartesianPoint {
        let lat = loc.latitude.to_radians();
        let lon = loc.longitude.to_radians();
        let r = self.radius_km;

        Vector3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        )
    }

    /// Inverse projection.
    ///
    /// Latitude comes from `asin(z / R)` with `z / R` clamped to `[-1, 1]`, so a
    /// solved point lying marginally outside the sphere still maps to a pole
    /// instead of NaN.
    pub fn to_geodetic(&self, p: &CartesianPoint) -> Location {
        let sin_lat = (p.z / self.radius_km).clamp(-1.0, 1.0);

        Location {
            latitude: sin_lat.asin().to_degrees(),
            longitude: p.y.atan2(p.x).to_degrees(),
        }
    }

    /// Straight-line distance through the sphere (km).
    ///
    /// This is the distance model the trilateration solver assumes.
    pub fn chord_distance(&self, a: &Location, b: &Location) -> f64 {
        (self.to_cartesian(a) - self.to_cartesian(b)).norm()
    }

    /// Great-circle distance along the surface (km), haversine formula
    pub fn surface_distance(&self, a: &Location, b: &Location) -> f64 {
        let lat1 = a.latitude.to_radians();
        let lat2 = b.latitude.to_radians();
        let dlat = (b.latitude - a.latitude).to_radians();
        let dlon = (b.longitude - a.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * self.radius_km * h.sqrt().min(1.0).asin()
    }
}
