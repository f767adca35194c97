//! Rainfall grid exporter.
//!
//! Persists one computed grid per time step as a self-describing Zarr V3
//! group: the `rainfall` array, the projected `x`/`y` coordinate axes,
//! the valid time, and enough projection metadata to tag the grid with
//! its CRS unambiguously.

pub mod error;
pub mod writer;

pub use error::{ExportError, Result};
pub use writer::{export_to_dir, ExportResult, ExporterConfig, GridExporter, ZarrCompression};
