//! Store capability trait and query result types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Link metadata returned by the proximity query.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMeta {
    pub link_id: i64,
    /// Longitude of the link midpoint, degrees.
    pub lon: f64,
    /// Latitude of the link midpoint, degrees.
    pub lat: f64,
}

/// One rain reading for a link at an exact timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RainReading {
    pub link_id: i64,
    /// Rain rate in mm/hr.
    pub rain: f64,
}

/// Outcome of a store query with explicit partial success.
///
/// Malformed documents are skipped individually and counted; they never
/// abort the whole query.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> FetchOutcome<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Capability handle for the metadata and observation stores.
///
/// Constructed once by the entry point and passed into the components
/// that query it; test code substitutes a fake.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Links whose midpoint lies within `radius_m` meters of the centre.
    async fn links_near(&self, lon: f64, lat: f64, radius_m: f64)
        -> Result<FetchOutcome<LinkMeta>>;

    /// Rain readings for exactly the given link ids at the exact
    /// timestamp. Links without both the timestamp and a rain field are
    /// absent from the result.
    async fn rain_at(
        &self,
        link_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<FetchOutcome<RainReading>>;
}
