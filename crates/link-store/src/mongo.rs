//! MongoDB implementation of the link store.
//!
//! Link metadata lives in `cml.cml_metadata` as GeoJSON features with a
//! 2dsphere-indexed `properties.midpoint`; time series readings live in
//! `cml.cml_data` keyed by `link_id` and `time.end_time`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::store::{FetchOutcome, LinkMeta, LinkStore, RainReading};

const DATABASE: &str = "cml";
const METADATA_COLLECTION: &str = "cml_metadata";
const DATA_COLLECTION: &str = "cml_data";

/// Store client backed by MongoDB.
pub struct MongoLinkStore {
    metadata: Collection<Document>,
    data: Collection<Document>,
}

impl MongoLinkStore {
    /// Connect to the store. Connection failure is fatal at startup.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let db = client.database(DATABASE);
        Ok(Self {
            metadata: db.collection(METADATA_COLLECTION),
            data: db.collection(DATA_COLLECTION),
        })
    }
}

/// Read a numeric field that may be stored as int32, int64 or double.
fn numeric_field(doc: &Document, key: &str) -> Option<f64> {
    match doc.get(key)? {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

/// Parse one metadata document into link id and midpoint coordinates.
fn parse_link_meta(doc: &Document) -> Option<LinkMeta> {
    let properties = doc.get_document("properties").ok()?;
    let link_id = numeric_field(properties, "link_id")? as i64;

    let midpoint = properties.get_document("midpoint").ok()?;
    let coords = midpoint.get_array("coordinates").ok()?;
    if coords.len() != 2 {
        return None;
    }
    let lon = coords[0].as_f64()?;
    let lat = coords[1].as_f64()?;

    Some(LinkMeta { link_id, lon, lat })
}

/// Parse one reading document into link id and rain rate.
fn parse_rain_reading(doc: &Document) -> Option<RainReading> {
    let link_id = numeric_field(doc, "link_id")? as i64;
    let rain = numeric_field(doc, "rain")?;
    if !rain.is_finite() {
        return None;
    }
    Some(RainReading { link_id, rain })
}

#[async_trait]
impl LinkStore for MongoLinkStore {
    async fn links_near(
        &self,
        lon: f64,
        lat: f64,
        radius_m: f64,
    ) -> Result<FetchOutcome<LinkMeta>> {
        let filter = doc! {
            "properties.midpoint": {
                "$nearSphere": {
                    "$geometry": { "type": "Point", "coordinates": [lon, lat] },
                    "$maxDistance": radius_m,
                }
            }
        };
        let options = FindOptions::builder()
            .projection(doc! { "properties.link_id": 1, "properties.midpoint": 1, "_id": 0 })
            .build();

        let mut cursor = self
            .metadata
            .find(filter, options)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut outcome = FetchOutcome::default();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(doc) => match parse_link_meta(&doc) {
                    Some(meta) => outcome.items.push(meta),
                    None => {
                        outcome.skipped += 1;
                        warn!("skipping malformed link metadata document");
                    }
                },
                Err(e) => {
                    outcome.skipped += 1;
                    warn!(error = %e, "skipping unreadable link metadata document");
                }
            }
        }
        Ok(outcome)
    }

    async fn rain_at(
        &self,
        link_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<FetchOutcome<RainReading>> {
        let ts = mongodb::bson::DateTime::from_millis(at.timestamp_millis());
        let filter = doc! {
            "link_id": { "$in": link_ids.to_vec() },
            "time.end_time": ts,
            "rain": { "$exists": true },
        };
        let options = FindOptions::builder()
            .projection(doc! { "link_id": 1, "rain": 1, "_id": 0 })
            .build();

        let mut cursor = self
            .data
            .find(filter, options)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut outcome = FetchOutcome::default();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(doc) => match parse_rain_reading(&doc) {
                    Some(reading) => outcome.items.push(reading),
                    None => {
                        outcome.skipped += 1;
                        warn!("skipping malformed rain reading document");
                    }
                },
                Err(e) => {
                    outcome.skipped += 1;
                    warn!(error = %e, "skipping unreadable rain reading document");
                }
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_meta() {
        let doc = doc! {
            "properties": {
                "link_id": 42,
                "midpoint": { "type": "Point", "coordinates": [4.5, 52.1] },
            }
        };
        let meta = parse_link_meta(&doc).unwrap();
        assert_eq!(meta.link_id, 42);
        assert!((meta.lon - 4.5).abs() < 1e-12);
        assert!((meta.lat - 52.1).abs() < 1e-12);
    }

    #[test]
    fn test_parse_link_meta_rejects_malformed() {
        assert!(parse_link_meta(&doc! { "properties": { "link_id": 1 } }).is_none());
        assert!(parse_link_meta(&doc! {
            "properties": {
                "link_id": 1,
                "midpoint": { "coordinates": [4.5] },
            }
        })
        .is_none());
        assert!(parse_link_meta(&doc! { "other": 1 }).is_none());
    }

    #[test]
    fn test_parse_rain_reading_numeric_variants() {
        let a = parse_rain_reading(&doc! { "link_id": 7_i32, "rain": 1.25 }).unwrap();
        assert_eq!(a, RainReading { link_id: 7, rain: 1.25 });

        let b = parse_rain_reading(&doc! { "link_id": 9_i64, "rain": 3_i32 }).unwrap();
        assert_eq!(b.rain, 3.0);

        assert!(parse_rain_reading(&doc! { "link_id": 7 }).is_none());
        assert!(parse_rain_reading(&doc! { "link_id": 7, "rain": f64::NAN }).is_none());
        assert!(parse_rain_reading(&doc! { "link_id": 7, "rain": "wet" }).is_none());
    }
}
