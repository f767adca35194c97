//! Observation assembly for one time step.

use chrono::{DateTime, Utc};
use cml_common::Observation;
use tracing::{debug, warn};

use crate::cache::LinkCoordinateCache;
use crate::store::LinkStore;

/// Join cached link pixel coordinates with the rain readings at `at`
/// into the flat observation list consumed by the grid builder.
///
/// The store query is scoped to exactly the cached link ids. A link with
/// no reading at this time contributes nothing (not a zero); a reading
/// for an id missing from the cache is dropped. A failed query is
/// recovered as an empty observation list with a warning, so the run
/// proceeds and yields a fully missing grid downstream.
pub async fn assemble_observations(
    store: &dyn LinkStore,
    cache: &LinkCoordinateCache,
    at: DateTime<Utc>,
) -> Vec<Observation> {
    if cache.is_empty() {
        return Vec::new();
    }

    let ids = cache.link_ids();
    let outcome = match store.rain_at(&ids, at).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "rain reading query failed, continuing with no observations");
            return Vec::new();
        }
    };
    if outcome.skipped > 0 {
        warn!(skipped = outcome.skipped, "skipped malformed rain reading documents");
    }

    let mut observations = Vec::with_capacity(outcome.items.len());
    for reading in outcome.items {
        match cache.get(reading.link_id) {
            Some(coord) => observations.push(Observation::new(reading.rain, coord.x, coord.y)),
            None => {
                warn!(link_id = reading.link_id, "reading for unknown link id, dropping");
            }
        }
    }

    debug!(
        links = ids.len(),
        observations = observations.len(),
        "assembled observations"
    );
    observations
}
