//! Forward/inverse geodetic transforms on a spherical earth.
//!
//! Each transform maps geographic (lon, lat) in degrees to projected
//! (easting, northing) in meters and back. The forward and inverse
//! directions are exact inverses of one another up to floating-point
//! precision.

use std::f64::consts::PI;

use crate::crs::{CrsKind, CrsSpec};
use crate::error::{ProjectionError, Result};

/// Earth radius in meters (WGS84 mean radius).
pub const EARTH_RADIUS: f64 = 6371229.0;

/// A concrete geodetic transform for one configured CRS.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoTransform {
    /// Azimuthal equidistant centered at (lon0, lat0), radians.
    AzimuthalEquidistant { lon0: f64, lat0: f64 },
    /// Transverse Mercator with central meridian lon0, radians.
    TransverseMercator { lon0: f64 },
}

/// Normalize a longitude difference to [-PI, PI].
fn normalize(mut dlon: f64) -> f64 {
    while dlon > PI {
        dlon -= 2.0 * PI;
    }
    while dlon < -PI {
        dlon += 2.0 * PI;
    }
    dlon
}

impl GeoTransform {
    /// Build the transform for a parsed CRS, anchored at the domain centre.
    pub fn new(crs: &CrsSpec, centre_lon: f64, centre_lat: f64) -> Self {
        let to_rad = PI / 180.0;
        match crs.kind {
            CrsKind::AzimuthalEquidistant => Self::AzimuthalEquidistant {
                lon0: centre_lon * to_rad,
                lat0: centre_lat * to_rad,
            },
            CrsKind::TransverseMercator { central_meridian } => Self::TransverseMercator {
                lon0: central_meridian * to_rad,
            },
        }
    }

    /// Geographic (degrees) to projected (meters).
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64)> {
        let to_rad = PI / 180.0;
        let lon = lon_deg * to_rad;
        let lat = lat_deg * to_rad;

        match *self {
            Self::AzimuthalEquidistant { lon0, lat0 } => {
                let dlon = normalize(lon - lon0);
                let cos_c = lat0.sin() * lat.sin() + lat0.cos() * lat.cos() * dlon.cos();
                let c = cos_c.clamp(-1.0, 1.0).acos();

                if c < 1e-12 {
                    return Ok((0.0, 0.0));
                }
                if (PI - c).abs() < 1e-9 {
                    // Antipode of the origin: direction is undefined.
                    return Err(ProjectionError::OutOfRange {
                        lon: lon_deg,
                        lat: lat_deg,
                    });
                }

                let k = c / c.sin();
                let x = EARTH_RADIUS * k * lat.cos() * dlon.sin();
                let y = EARTH_RADIUS
                    * k
                    * (lat0.cos() * lat.sin() - lat0.sin() * lat.cos() * dlon.cos());
                Ok((x, y))
            }
            Self::TransverseMercator { lon0 } => {
                let dlon = normalize(lon - lon0);
                let b = lat.cos() * dlon.sin();
                if b.abs() >= 1.0 - 1e-12 {
                    // 90 degrees away from the central meridian on the equator.
                    return Err(ProjectionError::OutOfRange {
                        lon: lon_deg,
                        lat: lat_deg,
                    });
                }

                let x = 0.5 * EARTH_RADIUS * ((1.0 + b) / (1.0 - b)).ln();
                let y = EARTH_RADIUS * lat.sin().atan2(lat.cos() * dlon.cos());
                Ok((x, y))
            }
        }
    }

    /// Projected (meters) to geographic (degrees).
    pub fn inverse(&self, east: f64, north: f64) -> Result<(f64, f64)> {
        let to_deg = 180.0 / PI;

        match *self {
            Self::AzimuthalEquidistant { lon0, lat0 } => {
                let rho = (east * east + north * north).sqrt();
                if rho < 1e-9 {
                    return Ok((lon0 * to_deg, lat0 * to_deg));
                }
                let c = rho / EARTH_RADIUS;
                if c > PI {
                    return Err(ProjectionError::InvalidDomain(format!(
                        "projected point ({east}, {north}) lies beyond the antipode"
                    )));
                }

                let sin_c = c.sin();
                let cos_c = c.cos();
                let lat = (cos_c * lat0.sin() + north * sin_c * lat0.cos() / rho)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lon = lon0
                    + (east * sin_c)
                        .atan2(rho * lat0.cos() * cos_c - north * lat0.sin() * sin_c);
                Ok((normalize(lon) * to_deg, lat * to_deg))
            }
            Self::TransverseMercator { lon0 } => {
                let d = north / EARTH_RADIUS;
                let xr = east / EARTH_RADIUS;
                let lat = (d.sin() / xr.cosh()).clamp(-1.0, 1.0).asin();
                let lon = lon0 + xr.sinh().atan2(d.cos());
                Ok((normalize(lon) * to_deg, lat * to_deg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CrsSpec;

    fn aeqd() -> GeoTransform {
        GeoTransform::new(&CrsSpec::parse("aeqd", 4.0).unwrap(), 4.0, 52.0)
    }

    fn tmerc() -> GeoTransform {
        GeoTransform::new(&CrsSpec::parse("tmerc", 4.0).unwrap(), 4.0, 52.0)
    }

    #[test]
    fn test_aeqd_origin_maps_to_zero() {
        let (x, y) = aeqd().forward(4.0, 52.0).unwrap();
        assert!(x.abs() < 1e-6, "x should be 0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be 0, got {}", y);
    }

    #[test]
    fn test_aeqd_roundtrip() {
        let t = aeqd();
        for &(lon, lat) in &[(4.5, 52.3), (3.2, 51.1), (6.0, 53.5), (4.0, 52.0)] {
            let (x, y) = t.forward(lon, lat).unwrap();
            let (lon2, lat2) = t.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon roundtrip: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat roundtrip: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_aeqd_distance_preserved_along_meridian() {
        // Azimuthal equidistant preserves distance from the origin.
        let t = aeqd();
        let (x, y) = t.forward(4.0, 53.0).unwrap();
        let dist = (x * x + y * y).sqrt();
        let expected = EARTH_RADIUS * 1.0_f64.to_radians();
        assert!(
            (dist - expected).abs() < 1.0,
            "1 degree north should be ~{} m, got {}",
            expected,
            dist
        );
    }

    #[test]
    fn test_aeqd_antipode_is_data_error() {
        let err = aeqd().forward(-176.0, -52.0);
        assert!(matches!(err, Err(ProjectionError::OutOfRange { .. })));
    }

    #[test]
    fn test_tmerc_roundtrip() {
        let t = tmerc();
        for &(lon, lat) in &[(4.0, 52.0), (5.5, 50.7), (2.1, 53.9), (-1.0, 48.0)] {
            let (x, y) = t.forward(lon, lat).unwrap();
            let (lon2, lat2) = t.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon roundtrip: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat roundtrip: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tmerc_central_meridian_is_x_zero() {
        let (x, _) = tmerc().forward(4.0, 45.0).unwrap();
        assert!(x.abs() < 1e-6);
    }
}
