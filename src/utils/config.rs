use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::algorithms::coordinates::CoordinateTransform;
use crate::algorithms::trilateration::TrilaterationSolver;
use crate::algorithms::vantage::VantagePointGenerator;
use crate::core::{DEFAULT_JITTER_DEGREES, EARTH_RADIUS_KM};
use crate::probe::search::SearchFilters;

/// Tunables for the pinpoint pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinpointConfig {
    /// Radius of the model sphere (km)
    pub earth_radius_km: f64,
    /// Half-width of the vantage jitter box (degrees)
    pub jitter_degrees: f64,
    /// Minimum sine of the angle between vantage baselines
    pub collinearity_tolerance: f64,
    /// Vantage points closer than this count as duplicates (km)
    pub min_baseline_km: f64,
    /// Redraws allowed when a vantage draw is degenerate
    pub max_redraws: u32,
    /// Fail instead of clamping when the spheres miss by more than this (km)
    pub max_inconsistency_km: Option<f64>,
    /// Issue a fourth probe to pick between the two roots
    pub disambiguation_probe: bool,
    /// Filters forwarded to the proximity search
    pub search: SearchFilters,
}

impl Default for PinpointConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            collinearity_tolerance: 1e-3,
            min_baseline_km: 1e-6,
            max_redraws: 16,
            max_inconsistency_km: None,
            disambiguation_probe: false,
            search: SearchFilters::default(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Configuration file I/O error
    #[error("config file I/O: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("config serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PinpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: PinpointConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidParameter {
                    parameter,
                    value: value.to_string(),
                    reason: "must be a positive finite number",
                })
            }
        }

        positive("earth_radius_km", self.earth_radius_km)?;
        positive("jitter_degrees", self.jitter_degrees)?;
        positive("collinearity_tolerance", self.collinearity_tolerance)?;
        positive("min_baseline_km", self.min_baseline_km)?;

        if self.jitter_degrees > 1.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "jitter_degrees",
                value: self.jitter_degrees.to_string(),
                reason: "vantage points must stay within the collaborator's search radius",
            });
        }

        if self.collinearity_tolerance >= 1.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "collinearity_tolerance",
                value: self.collinearity_tolerance.to_string(),
                reason: "a sine threshold of 1 rejects every triangle",
            });
        }

        if let Some(limit) = self.max_inconsistency_km {
            if !(limit >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "max_inconsistency_km",
                    value: limit.to_string(),
                    reason: "must be non-negative",
                });
            }
        }

        Ok(())
    }

    pub fn with_jitter(mut self, jitter_degrees: f64) -> Self {
        self.jitter_degrees = jitter_degrees;
        self
    }

    pub fn with_max_inconsistency(mut self, max_km: f64) -> Self {
        self.max_inconsistency_km = Some(max_km);
        self
    }

    pub fn with_disambiguation_probe(mut self, enabled: bool) -> Self {
        self.disambiguation_probe = enabled;
        self
    }

    pub fn with_search_filters(mut self, filters: SearchFilters) -> Self {
        self.search = filters;
        self
    }

    /// Solver built from these settings
    pub fn solver(&self) -> TrilaterationSolver {
        let mut solver = TrilaterationSolver::with_transform(CoordinateTransform::with_radius(self.earth_radius_km));
        solver.min_baseline_km = self.min_baseline_km;
        solver.collinearity_tolerance = self.collinearity_tolerance;
        solver.max_inconsistency_km = self.max_inconsistency_km;
        solver
    }

    /// Vantage generator whose degeneracy checks match [`Self::solver`]
    pub fn generator(&self) -> VantagePointGenerator {
        let mut generator = VantagePointGenerator::with_solver(self.solver());
        generator.jitter_degrees = self.jitter_degrees;
        generator.max_redraws = self.max_redraws;
        generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = PinpointConfig::default();
        assert_eq!(config.earth_radius_km, 6371.0);
        assert_eq!(config.jitter_degrees, 0.005);
        assert!(!config.disambiguation_probe);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        let config = PinpointConfig::default().with_jitter(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { parameter: "jitter_degrees", .. })
        ));

        let config = PinpointConfig::default().with_jitter(5.0);
        assert!(config.validate().is_err());

        let config = PinpointConfig {
            earth_radius_km: f64::NAN,
            ..PinpointConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PinpointConfig::default().with_max_inconsistency(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PinpointConfig =
            serde_json::from_str(r#"{ "jitter_degrees": 0.002, "search": { "online_only": true } }"#).unwrap();

        assert_eq!(config.jitter_degrees, 0.002);
        assert!(config.search.online_only);
        assert_eq!(config.earth_radius_km, EARTH_RADIUS_KM);
    }

    #[test]
    fn test_config_file_round_trip() {
        let config = PinpointConfig::default()
            .with_max_inconsistency(0.05)
            .with_disambiguation_probe(true);

        let path: PathBuf = std::env::temp_dir().join(format!("pinpoint_config_{}.json", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = PinpointConfig::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let result = PinpointConfig::from_file("/nonexistent/pinpoint.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_components_follow_config() {
        let config = PinpointConfig::default().with_max_inconsistency(0.1).with_jitter(0.002);
        let solver = config.solver();
        assert_eq!(solver.max_inconsistency_km, Some(0.1));
        assert_eq!(solver.transform().radius_km(), EARTH_RADIUS_KM);

        let generator = config.generator();
        assert_eq!(generator.jitter_degrees, 0.002);
    }
}
