//! Cached link pixel coordinates.

use std::collections::HashMap;

use cml_common::Domain;
use projection::ImageProjection;
use tracing::{info, warn};

use crate::store::LinkStore;

/// Per-link geographic and pixel coordinates, computed once via the
/// projection and cached for the domain's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCoordinate {
    pub link_id: i64,
    pub lon: f64,
    pub lat: f64,
    /// Pixel x (column) coordinate.
    pub x: f64,
    /// Pixel y (row) coordinate.
    pub y: f64,
}

/// Cache of the links inside the map area.
///
/// Built once before any computation that depends on it and read-only
/// afterwards; [`LinkCoordinateCache::refresh`] rebuilds it in full. It
/// is never partially updated.
#[derive(Debug, Default)]
pub struct LinkCoordinateCache {
    links: HashMap<i64, LinkCoordinate>,
}

impl LinkCoordinateCache {
    /// Populate the cache from the metadata store.
    ///
    /// The proximity query is bounded by the domain's half-diagonal so
    /// the cache covers the full grid including its corners. A failed
    /// query yields an empty cache with a warning; links the projection
    /// cannot place are skipped individually.
    pub async fn build(
        store: &dyn LinkStore,
        projection: &ImageProjection,
        domain: &Domain,
    ) -> Self {
        let radius_m = domain.half_diagonal_m();

        let outcome = match store
            .links_near(domain.centre_lon, domain.centre_lat, radius_m)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "link metadata query failed, continuing with empty cache");
                return Self::default();
            }
        };
        if outcome.skipped > 0 {
            warn!(skipped = outcome.skipped, "skipped malformed link metadata documents");
        }

        let mut links = HashMap::with_capacity(outcome.items.len());
        for meta in outcome.items {
            match projection.to_pixel(meta.lon, meta.lat) {
                Ok((x, y)) => {
                    links.insert(
                        meta.link_id,
                        LinkCoordinate {
                            link_id: meta.link_id,
                            lon: meta.lon,
                            lat: meta.lat,
                            x,
                            y,
                        },
                    );
                }
                Err(e) => {
                    warn!(link_id = meta.link_id, error = %e, "cannot project link midpoint, skipping");
                }
            }
        }

        info!(links = links.len(), radius_m, "populated link coordinate cache");
        Self { links }
    }

    /// Rebuild the cache in full, e.g. after domain reconfiguration.
    pub async fn refresh(
        &mut self,
        store: &dyn LinkStore,
        projection: &ImageProjection,
        domain: &Domain,
    ) {
        *self = Self::build(store, projection, domain).await;
    }

    pub fn get(&self, link_id: i64) -> Option<&LinkCoordinate> {
        self.links.get(&link_id)
    }

    /// Cached link ids in ascending order, for deterministic store queries.
    pub fn link_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.links.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
