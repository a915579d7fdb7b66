use serde_json::Value;

use crate::error::ParseError;
use crate::geojson::{Geometry, parse_feature_collection};

/// A named plate boundary (line or polygon).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: Option<String>,
    pub geometry: Geometry,
}

/// Decodes a boundary FeatureCollection. Features without geometry are
/// dropped. The name is read from `name`, falling back to `Name` which is
/// what the PB2002 dataset uses.
pub fn decode_boundaries(value: &Value) -> Result<Vec<BoundaryFeature>, ParseError> {
    let features = parse_feature_collection(value)?;
    Ok(features
        .into_iter()
        .filter_map(|f| {
            let name = ["name", "Name"]
                .iter()
                .find_map(|key| f.properties.get(*key).and_then(Value::as_str))
                .map(str::to_string);
            f.geometry.map(|geometry| BoundaryFeature { name, geometry })
        })
        .collect())
}

pub fn decode_boundaries_str(payload: &str) -> Result<Vec<BoundaryFeature>, ParseError> {
    let value: Value = serde_json::from_str(payload)?;
    decode_boundaries(&value)
}

#[cfg(test)]
mod tests {
    use super::decode_boundaries_str;
    use crate::error::ParseError;

    #[test]
    fn reads_both_name_spellings() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Pacific"},
             "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
            {"type":"Feature","properties":{"LAYER":"plate boundary","Name":"AF-AN"},
             "geometry":{"type":"LineString","coordinates":[[2,2],[3,3]]}},
            {"type":"Feature","properties":{},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
        ]}"#;
        let features = decode_boundaries_str(payload).unwrap();
        let names: Vec<Option<&str>> = features.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Pacific"), Some("AF-AN"), None]);
    }

    #[test]
    fn null_geometry_is_dropped() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Ghost"},"geometry":null}
        ]}"#;
        assert!(decode_boundaries_str(payload).unwrap().is_empty());
    }

    #[test]
    fn malformed_document_is_parse_error() {
        assert!(matches!(
            decode_boundaries_str("[]").unwrap_err(),
            ParseError::NotAFeatureCollection
        ));
    }
}
