//! Target CRS identifiers.
//!
//! The domain uses exactly one target CRS for its lifetime, named in the
//! run configuration. Two families are supported, both on a sphere:
//!
//! - `aeqd` — azimuthal equidistant, centered on the domain centre.
//! - `tmerc` or `tmerc:<lon0>` — transverse Mercator; the central
//!   meridian defaults to the domain centre longitude.

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Parsed target CRS specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsSpec {
    /// The identifier as configured (normalized to lowercase).
    pub name: String,
    /// Projection family.
    pub kind: CrsKind,
}

/// Supported projection families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrsKind {
    /// Azimuthal equidistant centered on the domain centre.
    AzimuthalEquidistant,
    /// Transverse Mercator with the given central meridian (degrees).
    TransverseMercator { central_meridian: f64 },
}

impl CrsSpec {
    /// Parse a CRS identifier. `centre_lon` supplies the default central
    /// meridian for `tmerc`.
    ///
    /// Fails with a configuration error on anything unrecognized.
    pub fn parse(identifier: &str, centre_lon: f64) -> Result<Self> {
        let name = identifier.trim().to_lowercase();

        if name == "aeqd" {
            return Ok(Self {
                name,
                kind: CrsKind::AzimuthalEquidistant,
            });
        }

        if name == "tmerc" {
            return Ok(Self {
                name,
                kind: CrsKind::TransverseMercator {
                    central_meridian: centre_lon,
                },
            });
        }

        if let Some(arg) = name.strip_prefix("tmerc:") {
            let lon0: f64 = arg
                .parse()
                .map_err(|_| ProjectionError::UnsupportedCrs(identifier.to_string()))?;
            if !(-180.0..=180.0).contains(&lon0) {
                return Err(ProjectionError::UnsupportedCrs(identifier.to_string()));
            }
            return Ok(Self {
                name,
                kind: CrsKind::TransverseMercator {
                    central_meridian: lon0,
                },
            });
        }

        Err(ProjectionError::UnsupportedCrs(identifier.to_string()))
    }

    /// Central meridian of the projection in degrees.
    pub fn central_meridian(&self, centre_lon: f64) -> f64 {
        match self.kind {
            CrsKind::AzimuthalEquidistant => centre_lon,
            CrsKind::TransverseMercator { central_meridian } => central_meridian,
        }
    }
}
