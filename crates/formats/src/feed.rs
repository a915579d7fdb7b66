//! Earthquake feed decoding.
//!
//! Feeds follow the USGS summary layout: a FeatureCollection of Point
//! features with `coordinates = [lon, lat, depth_km]` and
//! `properties.{mag, place, time}` where `time` is epoch milliseconds.

use foundation::{LatLon, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;
use crate::geojson::{Geometry, RawFeature, parse_feature_collection};

/// Label used when a feature carries no `place`.
pub const UNKNOWN_PLACE: &str = "Unknown";

/// One event from the feed. Never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeRecord {
    pub id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Kilometres below the surface.
    pub depth: f64,
    /// May be negative for small events.
    pub magnitude: f64,
    pub place: String,
    pub timestamp: Timestamp,
}

impl EarthquakeRecord {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Default, Deserialize)]
struct QuakeProperties {
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

/// Result of decoding a feed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarthquakeFeed {
    pub records: Vec<EarthquakeRecord>,
    /// Indices of features that had no usable point geometry.
    pub skipped: Vec<usize>,
}

impl EarthquakeFeed {
    pub fn from_geojson_str(payload: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, ParseError> {
        let mut feed = Self::default();
        for feature in parse_feature_collection(value)? {
            match decode_record(&feature)? {
                Some(record) => feed.records.push(record),
                None => feed.skipped.push(feature.index),
            }
        }
        Ok(feed)
    }
}

fn decode_record(feature: &RawFeature) -> Result<Option<EarthquakeRecord>, ParseError> {
    let Some(Geometry::Point(point)) = &feature.geometry else {
        return Ok(None);
    };

    let props: QuakeProperties =
        serde_json::from_value(Value::Object(feature.properties.clone())).map_err(|e| {
            ParseError::InvalidFeature {
                index: feature.index,
                reason: format!("bad properties: {e}"),
            }
        })?;

    Ok(Some(EarthquakeRecord {
        id: feature.id.clone(),
        latitude: point.lat_deg,
        longitude: point.lon_deg,
        depth: point.z.unwrap_or(0.0),
        // A null magnitude sizes like zero.
        magnitude: props.mag.unwrap_or(0.0),
        place: props.place.unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
        timestamp: Timestamp::from_millis(props.time.unwrap_or(0)),
    }))
}

#[cfg(test)]
mod tests {
    use super::{EarthquakeFeed, UNKNOWN_PLACE};
    use crate::error::ParseError;
    use foundation::Timestamp;
    use pretty_assertions::assert_eq;

    const BAY_AREA: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {"title": "USGS All Earthquakes, Past Week"},
        "features": [{
            "type": "Feature",
            "id": "nc75000001",
            "properties": {"mag": 4.5, "place": "Bay Area", "time": 1700000000000, "tsunami": 0},
            "geometry": {"type": "Point", "coordinates": [-122.4, 37.8, 10]}
        }]
    }"#;

    #[test]
    fn decodes_usgs_feature() {
        let feed = EarthquakeFeed::from_geojson_str(BAY_AREA).unwrap();
        assert_eq!(feed.records.len(), 1);
        let r = &feed.records[0];
        assert_eq!(r.id.as_deref(), Some("nc75000001"));
        assert_eq!((r.latitude, r.longitude, r.depth), (37.8, -122.4, 10.0));
        assert_eq!(r.magnitude, 4.5);
        assert_eq!(r.place, "Bay Area");
        assert_eq!(r.timestamp, Timestamp(1_700_000_000_000));
        assert!(feed.skipped.is_empty());
    }

    #[test]
    fn empty_collection_yields_no_records() {
        let feed =
            EarthquakeFeed::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#)
                .unwrap();
        assert_eq!(feed, EarthquakeFeed::default());
    }

    #[test]
    fn null_fields_fall_back() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":null,"place":null,"time":null},
             "geometry":{"type":"Point","coordinates":[10.0,20.0]}}
        ]}"#;
        let r = &EarthquakeFeed::from_geojson_str(payload).unwrap().records[0];
        assert_eq!(r.magnitude, 0.0);
        assert_eq!(r.depth, 0.0);
        assert_eq!(r.place, UNKNOWN_PLACE);
        assert_eq!(r.timestamp, Timestamp(0));
    }

    #[test]
    fn negative_magnitude_is_kept() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":-0.8,"place":"Nevada","time":1},
             "geometry":{"type":"Point","coordinates":[-117.0,38.0,2.5]}}
        ]}"#;
        let r = &EarthquakeFeed::from_geojson_str(payload).unwrap().records[0];
        assert_eq!(r.magnitude, -0.8);
    }

    #[test]
    fn non_point_features_are_skipped() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":1.0},"geometry":null},
            {"type":"Feature","properties":{"mag":2.0},
             "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
            {"type":"Feature","properties":{"mag":3.0},
             "geometry":{"type":"Point","coordinates":[0,0,5]}}
        ]}"#;
        let feed = EarthquakeFeed::from_geojson_str(payload).unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.skipped, vec![0, 1]);
    }

    #[test]
    fn mistyped_properties_are_a_parse_error() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":"big"},
             "geometry":{"type":"Point","coordinates":[0,0,5]}}
        ]}"#;
        let err = EarthquakeFeed::from_geojson_str(payload).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFeature { index: 0, .. }));
    }
}
