//! Pixel grid projection.
//!
//! Origin in the SW corner of the field, units in pixels. The domain's
//! configured centre maps to the centre of the grid.

use cml_common::Domain;
use serde::{Deserialize, Serialize};

use crate::crs::CrsSpec;
use crate::error::Result;
use crate::transform::{GeoTransform, EARTH_RADIUS};

/// Tolerance for approximate equality of projection state.
const APPROX_EPS: f64 = 0.01;

/// Bidirectional mapping between geographic coordinates and pixel
/// coordinates of the output grid.
///
/// Built once per run from the [`Domain`] and read-only afterwards. Two
/// instances equal within tolerance are interchangeable.
#[derive(Debug, Clone)]
pub struct ImageProjection {
    n_cols: usize,
    n_rows: usize,
    /// Pixel size in meters.
    p_size: f64,
    /// Projected easting of the SW corner.
    start_x: f64,
    /// Projected northing of the SW corner.
    start_y: f64,
    crs: CrsSpec,
    centre_lon: f64,
    centre_lat: f64,
    transform: GeoTransform,
}

/// Projection description handed to the grid exporter, sufficient to tag
/// an exported grid with its projection unambiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMetadata {
    pub crs_name: String,
    pub central_meridian: f64,
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub earth_radius_m: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub p_size: f64,
}

impl ImageProjection {
    /// Initialize the projection from the domain configuration.
    ///
    /// Computes the SW-corner offset so that the configured centre maps to
    /// the centre of the grid. Fails on a malformed or unsupported CRS
    /// identifier.
    pub fn new(domain: &Domain) -> Result<Self> {
        let crs = CrsSpec::parse(&domain.crs, domain.centre_lon)?;
        let transform = GeoTransform::new(&crs, domain.centre_lon, domain.centre_lat);

        let (cx, cy) = transform.forward(domain.centre_lon, domain.centre_lat)?;
        let start_x = cx - 0.5 * domain.n_cols as f64 * domain.p_size;
        let start_y = cy - 0.5 * domain.n_rows as f64 * domain.p_size;

        Ok(Self {
            n_cols: domain.n_cols,
            n_rows: domain.n_rows,
            p_size: domain.p_size,
            start_x,
            start_y,
            crs,
            centre_lon: domain.centre_lon,
            centre_lat: domain.centre_lat,
            transform,
        })
    }

    /// Convert lon/lat (degrees) into pixel coordinates.
    ///
    /// The result may be fractional and may lie outside the grid; a
    /// transform failure for out-of-range input is a data error.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let (east, north) = self.transform.forward(lon, lat)?;
        let x = (east - self.start_x) / self.p_size;
        let y = (north - self.start_y) / self.p_size;
        Ok((x, y))
    }

    /// Convert pixel coordinates back to lon/lat (degrees).
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let east = x * self.p_size + self.start_x;
        let north = y * self.p_size + self.start_y;
        self.transform.inverse(east, north)
    }

    /// Projected coordinate of each grid column (eastings).
    pub fn x_axis(&self) -> Vec<f64> {
        (0..self.n_cols)
            .map(|i| self.start_x + i as f64 * self.p_size)
            .collect()
    }

    /// Projected coordinate of each grid row (northings).
    pub fn y_axis(&self) -> Vec<f64> {
        (0..self.n_rows)
            .map(|i| self.start_y + i as f64 * self.p_size)
            .collect()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn p_size(&self) -> f64 {
        self.p_size
    }

    pub fn start_x(&self) -> f64 {
        self.start_x
    }

    pub fn start_y(&self) -> f64 {
        self.start_y
    }

    /// Approximate equality: exact on grid size and CRS name, tolerance
    /// on origin and pixel size. Two projections equal within tolerance
    /// are interchangeable.
    pub fn approx_eq(&self, other: &ImageProjection) -> bool {
        self.n_cols == other.n_cols
            && self.n_rows == other.n_rows
            && (self.start_x - other.start_x).abs() <= APPROX_EPS
            && (self.start_y - other.start_y).abs() <= APPROX_EPS
            && (self.p_size - other.p_size).abs() <= APPROX_EPS
            && self.crs.name == other.crs.name
    }

    /// Projection metadata for the exporter.
    pub fn metadata(&self) -> ProjectionMetadata {
        ProjectionMetadata {
            crs_name: self.crs.name.clone(),
            central_meridian: self.crs.central_meridian(self.centre_lon),
            origin_lon: self.centre_lon,
            origin_lat: self.centre_lat,
            earth_radius_m: EARTH_RADIUS,
            start_x: self.start_x,
            start_y: self.start_y,
            p_size: self.p_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(crs: &str) -> Domain {
        Domain {
            centre_lon: 4.0,
            centre_lat: 52.0,
            n_rows: 100,
            n_cols: 200,
            p_size: 1000.0,
            crs: crs.to_string(),
        }
    }

    #[test]
    fn test_centre_maps_to_grid_centre() {
        let pjn = ImageProjection::new(&domain("aeqd")).unwrap();
        let (x, y) = pjn.to_pixel(4.0, 52.0).unwrap();
        assert!((x - 100.0).abs() < 1e-9, "centre x should be n_cols/2, got {}", x);
        assert!((y - 50.0).abs() < 1e-9, "centre y should be n_rows/2, got {}", y);
    }

    #[test]
    fn test_pixel_roundtrip() {
        for crs in ["aeqd", "tmerc"] {
            let pjn = ImageProjection::new(&domain(crs)).unwrap();
            for &(px, py) in &[(0.0, 0.0), (100.0, 50.0), (199.0, 99.0), (37.25, 81.5)] {
                let (lon, lat) = pjn.to_geographic(px, py).unwrap();
                let (x, y) = pjn.to_pixel(lon, lat).unwrap();
                assert!((x - px).abs() < 1e-6, "{}: x roundtrip {} vs {}", crs, px, x);
                assert!((y - py).abs() < 1e-6, "{}: y roundtrip {} vs {}", crs, py, y);
            }
        }
    }

    #[test]
    fn test_geographic_roundtrip() {
        let pjn = ImageProjection::new(&domain("aeqd")).unwrap();
        let (x, y) = pjn.to_pixel(4.7, 52.4).unwrap();
        let (lon, lat) = pjn.to_geographic(x, y).unwrap();
        assert!((lon - 4.7).abs() < 1e-9);
        assert!((lat - 52.4).abs() < 1e-9);
    }

    #[test]
    fn test_axes_lengths_and_spacing() {
        let pjn = ImageProjection::new(&domain("aeqd")).unwrap();
        let xs = pjn.x_axis();
        let ys = pjn.y_axis();
        assert_eq!(xs.len(), 200);
        assert_eq!(ys.len(), 100);
        assert!((xs[1] - xs[0] - 1000.0).abs() < 1e-9);
        assert!((ys[0] - pjn.start_y()).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_crs_is_config_error() {
        assert!(ImageProjection::new(&domain("EPSG:32632")).is_err());
    }

    #[test]
    fn test_approx_eq() {
        let a = ImageProjection::new(&domain("aeqd")).unwrap();
        let b = ImageProjection::new(&domain("aeqd")).unwrap();
        assert!(a.approx_eq(&b));

        let mut d = domain("aeqd");
        d.n_cols = 201;
        let c = ImageProjection::new(&d).unwrap();
        assert!(!a.approx_eq(&c));

        let t = ImageProjection::new(&domain("tmerc")).unwrap();
        assert!(!a.approx_eq(&t));
    }

    #[test]
    fn test_metadata() {
        let pjn = ImageProjection::new(&domain("aeqd")).unwrap();
        let meta = pjn.metadata();
        assert_eq!(meta.crs_name, "aeqd");
        assert!((meta.central_meridian - 4.0).abs() < 1e-12);
        assert!((meta.p_size - 1000.0).abs() < 1e-12);
    }
}
