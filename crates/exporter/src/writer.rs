//! Zarr V3 writer for computed rainfall grids.
//!
//! One grid per time step becomes one Zarr group with a `rainfall`
//! array, `x`/`y` coordinate axes, and attributes carrying the valid
//! time and projection metadata.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};
use zarrs_filesystem::FilesystemStore;

use cml_common::{epoch_seconds, format_iso_utc, RainGrid};
use projection::ProjectionMetadata;

use crate::error::{ExportError, Result};

/// Compression codec applied to the rainfall array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZarrCompression {
    None,
    Lz4,
    Zstd,
}

impl ZarrCompression {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZarrCompression::None => "none",
            ZarrCompression::Lz4 => "lz4",
            ZarrCompression::Zstd => "zstd",
        }
    }
}

fn default_chunk_size() -> usize {
    256
}

fn default_compression() -> ZarrCompression {
    ZarrCompression::Zstd
}

fn default_compression_level() -> u8 {
    3
}

fn default_shuffle() -> bool {
    true
}

/// Exporter settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExporterConfig {
    /// Chunk edge length for the rainfall array.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_compression")]
    pub compression: ZarrCompression,
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            compression: default_compression(),
            compression_level: default_compression_level(),
            shuffle: default_shuffle(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be positive".to_string());
        }
        if self.compression_level > 9 {
            return Err(format!(
                "compression_level must be 0..=9, got {}",
                self.compression_level
            ));
        }
        Ok(())
    }
}

/// Result of one export.
#[derive(Debug)]
pub struct ExportResult {
    /// Uncompressed payload size of the rainfall array.
    pub bytes_written: u64,
    /// Number of NaN cells in the exported grid.
    pub missing_cells: usize,
}

/// Writer for persisting one rainfall grid per time step.
pub struct GridExporter {
    config: ExporterConfig,
}

impl GridExporter {
    pub fn new(config: ExporterConfig) -> Result<Self> {
        config.validate().map_err(ExportError::Config)?;
        Ok(Self { config })
    }

    /// Write the grid, its coordinate axes and metadata to `storage`.
    ///
    /// The root group carries the valid time and the projection
    /// description; `/rainfall` holds the grid in row-major order with
    /// row 0 at the southern edge, `/x` and `/y` hold the projected
    /// axis coordinates in meters.
    pub fn write<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: S,
        grid: &RainGrid,
        x_axis: &[f64],
        y_axis: &[f64],
        projection: &ProjectionMetadata,
        valid_time: DateTime<Utc>,
    ) -> Result<ExportResult> {
        if x_axis.len() != grid.n_cols() || y_axis.len() != grid.n_rows() {
            return Err(ExportError::Dimensions(format!(
                "grid is {}x{} but axes are x={} y={}",
                grid.n_rows(),
                grid.n_cols(),
                x_axis.len(),
                y_axis.len()
            )));
        }

        let store = Arc::new(storage);

        let group = GroupBuilder::new()
            .attributes(self.group_attributes(projection, valid_time))
            .build(store.clone(), "/")
            .map_err(|e| ExportError::Storage(e.to_string()))?;
        group
            .store_metadata()
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        self.write_rainfall(store.clone(), grid)?;
        self.write_axis(store.clone(), "/x", "x", x_axis)?;
        self.write_axis(store, "/y", "y", y_axis)?;

        let bytes_written = (grid.as_slice().len() * std::mem::size_of::<f32>()) as u64;
        Ok(ExportResult {
            bytes_written,
            missing_cells: grid.missing_count(),
        })
    }

    fn group_attributes(
        &self,
        projection: &ProjectionMetadata,
        valid_time: DateTime<Utc>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut attrs = serde_json::Map::new();
        attrs.insert("parameter".to_string(), serde_json::json!("rainfall_rate"));
        attrs.insert(
            "long_name".to_string(),
            serde_json::json!("rainfall rate estimated from commercial microwave links"),
        );
        attrs.insert("units".to_string(), serde_json::json!("mm/hr"));
        attrs.insert(
            "valid_time".to_string(),
            serde_json::json!(format_iso_utc(valid_time)),
        );
        attrs.insert(
            "valid_time_epoch".to_string(),
            serde_json::json!(epoch_seconds(valid_time)),
        );
        attrs.insert("crs".to_string(), serde_json::json!(projection.crs_name));
        attrs.insert(
            "central_meridian".to_string(),
            serde_json::json!(projection.central_meridian),
        );
        attrs.insert(
            "origin_lon".to_string(),
            serde_json::json!(projection.origin_lon),
        );
        attrs.insert(
            "origin_lat".to_string(),
            serde_json::json!(projection.origin_lat),
        );
        attrs.insert(
            "earth_radius_m".to_string(),
            serde_json::json!(projection.earth_radius_m),
        );
        attrs.insert("start_x".to_string(), serde_json::json!(projection.start_x));
        attrs.insert("start_y".to_string(), serde_json::json!(projection.start_y));
        attrs.insert("p_size".to_string(), serde_json::json!(projection.p_size));
        attrs
    }

    fn write_rainfall<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        store: Arc<S>,
        grid: &RainGrid,
    ) -> Result<()> {
        let rows = grid.n_rows() as u64;
        let cols = grid.n_cols() as u64;
        let chunk = self.config.chunk_size as u64;

        let chunk_grid: zarrs::array::ChunkGrid = vec![chunk, chunk]
            .try_into()
            .map_err(|e| ExportError::Config(format!("{:?}", e)))?;

        let mut attrs = serde_json::Map::new();
        attrs.insert(
            "_ARRAY_DIMENSIONS".to_string(),
            serde_json::json!(["y", "x"]),
        );
        attrs.insert("units".to_string(), serde_json::json!("mm/hr"));

        let mut binding = ArrayBuilder::new(
            vec![rows, cols],
            DataType::Float32,
            chunk_grid,
            FillValue::from(f32::NAN),
        );
        let mut builder = binding.attributes(attrs);

        let compressor = match self.config.compression {
            ZarrCompression::None => None,
            ZarrCompression::Lz4 => Some(BloscCompressor::LZ4),
            ZarrCompression::Zstd => Some(BloscCompressor::Zstd),
        };
        if let Some(compressor) = compressor {
            builder = builder.bytes_to_bytes_codecs(vec![self.blosc_codec(compressor)?]);
        }

        let array = builder
            .build(store, "/rainfall")
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        array
            .store_metadata()
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        let subset = ArraySubset::new_with_start_shape(vec![0, 0], vec![rows, cols])
            .map_err(|e| ExportError::Storage(e.to_string()))?;
        array
            .store_array_subset_elements(&subset, grid.as_slice())
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        Ok(())
    }

    fn write_axis<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        store: Arc<S>,
        path: &str,
        dimension: &str,
        values: &[f64],
    ) -> Result<()> {
        let len = values.len() as u64;

        let chunk_grid: zarrs::array::ChunkGrid = vec![len]
            .try_into()
            .map_err(|e| ExportError::Config(format!("{:?}", e)))?;

        let mut attrs = serde_json::Map::new();
        attrs.insert(
            "_ARRAY_DIMENSIONS".to_string(),
            serde_json::json!([dimension]),
        );
        attrs.insert("units".to_string(), serde_json::json!("m"));

        let array = ArrayBuilder::new(
            vec![len],
            DataType::Float64,
            chunk_grid,
            FillValue::from(f64::NAN),
        )
        .attributes(attrs)
        .build(store, path)
        .map_err(|e| ExportError::Storage(e.to_string()))?;

        array
            .store_metadata()
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        let subset = ArraySubset::new_with_start_shape(vec![0], vec![len])
            .map_err(|e| ExportError::Storage(e.to_string()))?;
        array
            .store_array_subset_elements(&subset, values)
            .map_err(|e| ExportError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Blosc codec for the rainfall array. Shuffling needs the element
    /// width; rainfall cells are f32.
    fn blosc_codec(
        &self,
        compressor: BloscCompressor,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level =
            BloscCompressionLevel::try_from(self.config.compression_level).map_err(|_| {
                ExportError::Config(format!(
                    "compression level {} out of range",
                    self.config.compression_level
                ))
            })?;

        let (shuffle, typesize) = if self.config.shuffle {
            (BloscShuffleMode::Shuffle, Some(std::mem::size_of::<f32>()))
        } else {
            (BloscShuffleMode::NoShuffle, None)
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| ExportError::Config(e.to_string()))?;
        Ok(Arc::new(codec))
    }
}

/// Write one grid as a Zarr group at `path` on the local filesystem,
/// creating the directory.
pub fn export_to_dir(
    path: &Path,
    config: &ExporterConfig,
    grid: &RainGrid,
    x_axis: &[f64],
    y_axis: &[f64],
    projection: &ProjectionMetadata,
    valid_time: DateTime<Utc>,
) -> Result<ExportResult> {
    std::fs::create_dir_all(path).map_err(|e| ExportError::Storage(e.to_string()))?;
    let store = FilesystemStore::new(path).map_err(|e| ExportError::Storage(e.to_string()))?;
    let exporter = GridExporter::new(config.clone())?;
    exporter.write(store, grid, x_axis, y_axis, projection, valid_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cml_common::parse_iso_utc;

    fn metadata() -> ProjectionMetadata {
        ProjectionMetadata {
            crs_name: "aeqd".to_string(),
            central_meridian: 4.0,
            origin_lon: 4.0,
            origin_lat: 52.0,
            earth_radius_m: 6_371_229.0,
            start_x: -50_000.0,
            start_y: -40_000.0,
            p_size: 1000.0,
        }
    }

    fn grid(rows: usize, cols: usize) -> RainGrid {
        let mut g = RainGrid::filled_with_nan(rows, cols);
        for y in 0..rows {
            for x in 0..cols {
                g.set(x, y, (y * cols + x) as f32 * 0.1);
            }
        }
        g
    }

    fn axes(rows: usize, cols: usize) -> (Vec<f64>, Vec<f64>) {
        let xs = (0..cols).map(|i| -50_000.0 + i as f64 * 1000.0).collect();
        let ys = (0..rows).map(|i| -40_000.0 + i as f64 * 1000.0).collect();
        (xs, ys)
    }

    #[test]
    fn test_export_uncompressed() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = temp_dir.path().join("grid.zarr");

        let config = ExporterConfig {
            compression: ZarrCompression::None,
            ..Default::default()
        };
        let g = grid(80, 100);
        let (xs, ys) = axes(80, 100);
        let at = parse_iso_utc("2024-03-01T12:00:00Z").unwrap();

        let result =
            export_to_dir(&out, &config, &g, &xs, &ys, &metadata(), at).expect("export failed");

        assert_eq!(result.bytes_written, 80 * 100 * 4);
        assert_eq!(result.missing_cells, 0);
        assert!(out.join("zarr.json").exists());
        assert!(out.join("rainfall").join("zarr.json").exists());
        assert!(out.join("x").join("zarr.json").exists());
        assert!(out.join("y").join("zarr.json").exists());
    }

    #[test]
    fn test_export_compressed_counts_missing() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = temp_dir.path().join("grid.zarr");

        let config = ExporterConfig {
            compression: ZarrCompression::Zstd,
            compression_level: 1,
            shuffle: true,
            chunk_size: 32,
        };
        let mut g = grid(40, 60);
        g.set(3, 5, f32::NAN);
        g.set(10, 20, f32::NAN);
        let (xs, ys) = axes(40, 60);
        let at = parse_iso_utc("2024-03-01T12:15:00Z").unwrap();

        let result =
            export_to_dir(&out, &config, &g, &xs, &ys, &metadata(), at).expect("export failed");
        assert_eq!(result.missing_cells, 2);
    }

    #[test]
    fn test_export_lz4_without_shuffle() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = temp_dir.path().join("grid.zarr");

        let config = ExporterConfig {
            compression: ZarrCompression::Lz4,
            shuffle: false,
            ..Default::default()
        };
        let g = grid(20, 20);
        let (xs, ys) = axes(20, 20);
        let at = parse_iso_utc("2024-03-01T12:30:00Z").unwrap();

        let result =
            export_to_dir(&out, &config, &g, &xs, &ys, &metadata(), at).expect("export failed");
        assert_eq!(result.bytes_written, 20 * 20 * 4);
        assert!(out.join("rainfall").join("zarr.json").exists());
    }

    #[test]
    fn test_group_attributes_carry_time_and_projection() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = temp_dir.path().join("grid.zarr");

        let g = grid(10, 10);
        let (xs, ys) = axes(10, 10);
        let at = parse_iso_utc("2024-03-01T12:00:00Z").unwrap();
        export_to_dir(&out, &ExporterConfig::default(), &g, &xs, &ys, &metadata(), at)
            .expect("export failed");

        let raw = std::fs::read_to_string(out.join("zarr.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let attrs = &json["attributes"];
        assert_eq!(attrs["valid_time"], "2024-03-01T12:00:00Z");
        assert_eq!(attrs["crs"], "aeqd");
        assert_eq!(attrs["units"], "mm/hr");
        assert!((attrs["p_size"].as_f64().unwrap() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_length_mismatch_is_error() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let out = temp_dir.path().join("grid.zarr");

        let g = grid(10, 10);
        let (xs, _) = axes(10, 10);
        let ys = vec![0.0; 7];
        let at = parse_iso_utc("2024-03-01T12:00:00Z").unwrap();

        let err = export_to_dir(&out, &ExporterConfig::default(), &g, &xs, &ys, &metadata(), at)
            .unwrap_err();
        assert!(matches!(err, ExportError::Dimensions(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExporterConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(GridExporter::new(config).is_err());
    }
}
