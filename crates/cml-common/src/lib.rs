//! Shared types for the CML rainfall mapping workspace.
//!
//! A run is described by a [`Domain`]: the grid geometry, the geographic
//! centre, and the target CRS. One [`RainGrid`] is produced per time step
//! from a transient list of [`Observation`]s.

pub mod domain;
pub mod error;
pub mod grid;
pub mod time;

pub use domain::Domain;
pub use error::{CmlError, CmlResult};
pub use grid::{Observation, RainGrid};
pub use time::{epoch_seconds, format_iso_utc, from_epoch_seconds, parse_iso_utc};
