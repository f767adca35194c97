//! CML rainfall mapper service.
//!
//! Turns sparse commercial-microwave-link rain readings into dense
//! rainfall-rate grids: one grid per time step over a closed interval,
//! each exported as a Zarr group named by its valid time.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cml_common::{format_iso_utc, parse_iso_utc};
use exporter::export_to_dir;
use interpolator::{EstimatorKind, GridBuilder};
use link_store::{assemble_observations, LinkCoordinateCache, MongoLinkStore};
use projection::ImageProjection;

use config::MapperConfig;

#[derive(Parser, Debug)]
#[command(name = "mapper")]
#[command(about = "Rainfall map generation from commercial microwave links")]
struct Args {
    /// First time step, YYYY-MM-DDTHH:MM:SSZ
    #[arg(short, long)]
    start: String,

    /// Last time step (inclusive), YYYY-MM-DDTHH:MM:SSZ
    #[arg(short, long)]
    end: String,

    /// Configuration file path
    #[arg(short, long, default_value = "/etc/mapper/config.json")]
    config: PathBuf,

    /// Override the configured estimator (kriging or idw)
    #[arg(long)]
    estimator: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting rainfall mapper");

    let start = parse_iso_utc(&args.start)
        .map_err(|e| anyhow::anyhow!("invalid --start: {}", e))?;
    let end = parse_iso_utc(&args.end).map_err(|e| anyhow::anyhow!("invalid --end: {}", e))?;
    if end < start {
        anyhow::bail!("--end {} is before --start {}", args.end, args.start);
    }

    let config = MapperConfig::from_file(&args.config)?;
    let estimator = match &args.estimator {
        Some(s) => s
            .parse::<EstimatorKind>()
            .map_err(|e| anyhow::anyhow!("invalid --estimator: {}", e))?,
        None => config.estimator,
    };
    info!(
        estimator = %estimator,
        crs = %config.domain.crs,
        rows = config.domain.n_rows,
        cols = config.domain.n_cols,
        "Loaded configuration"
    );

    run(&config, estimator, start, end).await
}

async fn run(
    config: &MapperConfig,
    estimator: EstimatorKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<()> {
    let projection = ImageProjection::new(&config.domain)?;
    let builder = GridBuilder::new(
        config.domain.n_rows,
        config.domain.n_cols,
        config.builder.clone(),
    )?;

    let store = MongoLinkStore::connect(&config.store_uri)
        .await
        .context("cannot connect to link store")?;
    let cache = LinkCoordinateCache::build(&store, &projection, &config.domain).await;
    if cache.is_empty() {
        warn!("no links in the map area, all grids will be fully missing");
    }

    let x_axis = projection.x_axis();
    let y_axis = projection.y_axis();
    let proj_meta = projection.metadata();
    let step = Duration::seconds(config.time_step_secs);

    let mut written = 0usize;
    let mut failed = 0usize;
    let mut at = start;
    while at <= end {
        let observations = assemble_observations(&store, &cache, at).await;
        info!(
            time = %format_iso_utc(at),
            observations = observations.len(),
            "computing grid"
        );

        match builder.build(estimator, &observations) {
            Ok(grid) => {
                let out = PathBuf::from(&config.directory)
                    .join(format!("{}_{}.zarr", format_iso_utc(at), config.name));
                match export_to_dir(
                    &out,
                    &config.exporter,
                    &grid,
                    &x_axis,
                    &y_axis,
                    &proj_meta,
                    at,
                ) {
                    Ok(result) => {
                        info!(
                            path = %out.display(),
                            bytes = result.bytes_written,
                            missing = result.missing_cells,
                            "wrote grid"
                        );
                        written += 1;
                    }
                    Err(e) => {
                        error!(time = %format_iso_utc(at), error = %e, "export failed");
                        failed += 1;
                    }
                }
            }
            Err(e) => {
                error!(time = %format_iso_utc(at), error = %e, "grid computation failed");
                failed += 1;
            }
        }

        at += step;
    }

    info!(written, failed, "mapper run completed");
    if written == 0 && failed > 0 {
        anyhow::bail!("all {} time steps failed", failed);
    }
    Ok(())
}
