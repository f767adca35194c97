//! Run configuration for the mapper service.

use std::path::Path;

use anyhow::{Context, Result};
use cml_common::Domain;
use exporter::ExporterConfig;
use interpolator::{BuilderConfig, EstimatorKind};
use serde::{Deserialize, Serialize};

fn default_store_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_directory() -> String {
    "./output".to_string()
}

fn default_name() -> String {
    "rainfields".to_string()
}

fn default_time_step_secs() -> i64 {
    900
}

/// Full run configuration, loaded from a JSON file at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Grid geometry and projection anchor.
    pub domain: Domain,

    /// Which estimator fills the grid.
    #[serde(default)]
    pub estimator: EstimatorKind,

    /// Grid-builder and estimator parameters.
    #[serde(default)]
    pub builder: BuilderConfig,

    /// Output format settings.
    #[serde(default)]
    pub exporter: ExporterConfig,

    /// MongoDB connection string. `MONGO_URI` in the environment wins.
    #[serde(default = "default_store_uri")]
    pub store_uri: String,

    /// Directory exported grids are written into.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Output name suffix: files are `<time>_<name>.zarr`.
    #[serde(default = "default_name")]
    pub name: String,

    /// Seconds between successive maps.
    #[serde(default = "default_time_step_secs")]
    pub time_step_secs: i64,
}

impl MapperConfig {
    /// Load and validate the configuration from a JSON file.
    ///
    /// The store URI may be overridden by the `MONGO_URI` environment
    /// variable so credentials stay out of the config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut config: MapperConfig = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;

        if let Ok(uri) = std::env::var("MONGO_URI") {
            config.store_uri = uri;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.domain
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid domain: {}", e))?;
        self.builder
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid builder config: {}", e))?;
        self.exporter
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid exporter config: {}", e))?;
        if self.time_step_secs <= 0 {
            anyhow::bail!("time_step_secs must be > 0, got {}", self.time_step_secs);
        }
        if self.store_uri.trim().is_empty() {
            anyhow::bail!("store_uri is empty");
        }
        if self.name.trim().is_empty() {
            anyhow::bail!("name is empty");
        }
        Ok(())
    }
}
