//! Estimator and grid-builder configuration.

use serde::{Deserialize, Serialize};

use crate::variogram::VariogramParams;

/// Which surface estimator fills the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Ordinary kriging with the spherical variogram.
    #[default]
    Kriging,
    /// Squared-inverse-distance weighting.
    Idw,
}

impl std::str::FromStr for EstimatorKind {
    type Err = crate::error::InterpolationError;

    /// Parse an estimator name, case-insensitive. Unknown names are a
    /// configuration error rather than a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kriging" => Ok(Self::Kriging),
            "idw" => Ok(Self::Idw),
            other => Err(crate::error::InterpolationError::Config(format!(
                "unknown estimator '{}', expected 'kriging' or 'idw'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kriging => write!(f, "kriging"),
            Self::Idw => write!(f, "idw"),
        }
    }
}

fn default_range() -> f64 {
    20.0
}

fn default_min_locals() -> usize {
    10
}

fn default_prescale() -> f64 {
    1.0
}

/// Kriging estimator parameters.
///
/// Rain rates are variance-stabilized with an inverse-hyperbolic-sine
/// transform (`asinh(value * prescale)`) before the solve and inverted
/// after; clamps apply to the back-transformed rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KrigingConfig {
    /// Spherical variogram parameters, pixel units.
    #[serde(default)]
    pub variogram: VariogramParams,
    /// Local-observation search radius around a tile centre, pixels.
    #[serde(default = "default_range")]
    pub range: f64,
    /// Minimum local observations required to interpolate a tile.
    #[serde(default = "default_min_locals")]
    pub min_locals: usize,
    /// Prescale factor of the inverse-hyperbolic-sine transform.
    #[serde(default = "default_prescale")]
    pub prescale: f64,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            variogram: VariogramParams::default(),
            range: default_range(),
            min_locals: default_min_locals(),
            prescale: default_prescale(),
        }
    }
}

impl KrigingConfig {
    /// Forward variance-stabilizing transform.
    pub fn to_ihs(&self, value: f64) -> f64 {
        (value * self.prescale).asinh()
    }

    /// Inverse transform; non-positive estimates map to zero rain.
    pub fn from_ihs(&self, value: f64) -> f64 {
        if value > 0.0 {
            value.sinh() / self.prescale
        } else {
            0.0
        }
    }
}

/// IDW estimator parameters. IDW operates on raw rain rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdwConfig {
    /// Local-observation search radius around a tile centre, pixels.
    #[serde(default = "default_range")]
    pub range: f64,
    /// Minimum local observations required to interpolate a tile.
    #[serde(default = "default_min_locals")]
    pub min_locals: usize,
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self {
            range: default_range(),
            min_locals: default_min_locals(),
        }
    }
}

fn default_box_step() -> usize {
    5
}

fn default_max_rain() -> f64 {
    200.0
}

fn default_min_rain() -> f64 {
    0.5
}

/// Configuration of the box-tiled grid builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Tile side length in pixels. Must be odd.
    #[serde(default = "default_box_step")]
    pub box_step: usize,
    /// Rates above this bound are implausible and become missing data.
    #[serde(default = "default_max_rain")]
    pub max_rain: f64,
    /// Rates below this noise floor are clamped to zero.
    #[serde(default = "default_min_rain")]
    pub min_rain: f64,
    #[serde(default)]
    pub kriging: KrigingConfig,
    #[serde(default)]
    pub idw: IdwConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            box_step: default_box_step(),
            max_rain: default_max_rain(),
            min_rain: default_min_rain(),
            kriging: KrigingConfig::default(),
            idw: IdwConfig::default(),
        }
    }
}

impl BuilderConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.box_step == 0 || self.box_step % 2 == 0 {
            return Err(format!("box_step must be odd and > 0, got {}", self.box_step));
        }
        if !(self.kriging.range > 0.0) || !(self.idw.range > 0.0) {
            return Err("estimator search range must be > 0".to_string());
        }
        if self.kriging.min_locals == 0 || self.idw.min_locals == 0 {
            return Err("min_locals must be >= 1".to_string());
        }
        if !(self.kriging.prescale > 0.0) {
            return Err(format!(
                "kriging prescale must be > 0, got {}",
                self.kriging.prescale
            ));
        }
        if !(self.kriging.variogram.range > 0.0) || self.kriging.variogram.sill < 0.0 {
            return Err("variogram range must be > 0 and sill >= 0".to_string());
        }
        if self.max_rain <= self.min_rain {
            return Err("max_rain must be greater than min_rain".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BuilderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.box_step, 5);
        assert_eq!(config.kriging.min_locals, 10);
        assert_eq!(config.idw.min_locals, 10);
    }

    #[test]
    fn test_even_box_step_rejected() {
        let mut config = BuilderConfig::default();
        config.box_step = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ihs_roundtrip() {
        let k = KrigingConfig {
            prescale: 0.5,
            ..Default::default()
        };
        for &v in &[0.6, 3.0, 50.0, 199.0] {
            let back = k.from_ihs(k.to_ihs(v));
            assert!((back - v).abs() < 1e-9, "ihs roundtrip {} vs {}", v, back);
        }
        // Negative estimates map to zero rain.
        assert_eq!(k.from_ihs(-0.3), 0.0);
    }

    #[test]
    fn test_estimator_kind_from_str() {
        assert_eq!("idw".parse::<EstimatorKind>().unwrap(), EstimatorKind::Idw);
        assert_eq!("IDW".parse::<EstimatorKind>().unwrap(), EstimatorKind::Idw);
        assert_eq!(
            "Kriging".parse::<EstimatorKind>().unwrap(),
            EstimatorKind::Kriging
        );
    }

    #[test]
    fn test_unknown_estimator_name_is_config_error() {
        let err = "krigging".parse::<EstimatorKind>().unwrap_err();
        assert!(matches!(err, crate::error::InterpolationError::Config(_)));
        assert!(err.to_string().contains("krigging"));
    }
}
