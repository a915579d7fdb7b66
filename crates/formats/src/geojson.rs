use serde_json::{Map, Value, json};

use crate::error::ParseError;

/// GeoJSON position. `z` carries the optional third coordinate
/// (earthquake feeds put hypocenter depth there).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub z: Option<f64>,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            z: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn to_geojson_value(&self) -> Value {
        let coordinates = match self {
            Geometry::Point(p) => point_coords(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => points_coords(ps),
            Geometry::MultiLineString(rings) | Geometry::Polygon(rings) => {
                Value::Array(rings.iter().map(|r| points_coords(r)).collect())
            }
            Geometry::MultiPolygon(polys) => Value::Array(
                polys
                    .iter()
                    .map(|poly| Value::Array(poly.iter().map(|r| points_coords(r)).collect()))
                    .collect(),
            ),
        };
        json!({ "type": self.type_name(), "coordinates": coordinates })
    }
}

/// One member of a FeatureCollection before domain decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub index: usize,
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` when the feature has a null geometry.
    pub geometry: Option<Geometry>,
}

pub fn parse_feature_collection_str(payload: &str) -> Result<Vec<RawFeature>, ParseError> {
    let value: Value = serde_json::from_str(payload)?;
    parse_feature_collection(&value)
}

pub fn parse_feature_collection(value: &Value) -> Result<Vec<RawFeature>, ParseError> {
    let obj = value.as_object().ok_or(ParseError::NotAFeatureCollection)?;
    if obj.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(ParseError::NotAFeatureCollection);
    }
    let members = obj
        .get("features")
        .and_then(Value::as_array)
        .ok_or(ParseError::NotAFeatureCollection)?;

    members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let (id, properties, geometry) = parse_feature(member)
                .map_err(|reason| ParseError::InvalidFeature { index, reason })?;
            Ok(RawFeature {
                index,
                id,
                properties,
                geometry,
            })
        })
        .collect()
}

type FeatureParts = (Option<String>, Map<String, Value>, Option<Geometry>);

fn parse_feature(value: &Value) -> Result<FeatureParts, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;
    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => return Err(format!("unexpected feature type: {other}")),
        None => return Err("feature missing type".to_string()),
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = match obj.get("geometry") {
        None => return Err("feature missing geometry".to_string()),
        Some(Value::Null) => None,
        Some(g) => Some(parse_geometry(g)?),
    };

    Ok((id, properties, geometry))
}

pub fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let obj = value.as_object().ok_or("geometry must be an object")?;
    let ty = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry missing type")?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates")?;

    match ty {
        "Point" => parse_point(coords).map(Geometry::Point),
        "MultiPoint" => parse_points(coords).map(Geometry::MultiPoint),
        "LineString" => parse_points(coords).map(Geometry::LineString),
        "MultiLineString" => parse_rings(coords).map(Geometry::MultiLineString),
        "Polygon" => parse_rings(coords).map(Geometry::Polygon),
        "MultiPolygon" => array(coords)?
            .iter()
            .map(parse_rings)
            .collect::<Result<_, _>>()
            .map(Geometry::MultiPolygon),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn array(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| "coordinates must be an array".to_string())
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = array(coords)?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("longitude must be a number")?;
    let lat = arr[1].as_f64().ok_or("latitude must be a number")?;
    let point = GeoPoint::new(lon, lat);
    Ok(match arr.get(2).and_then(Value::as_f64) {
        Some(z) => point.with_z(z),
        None => point,
    })
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    array(coords)?.iter().map(parse_point).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    array(coords)?.iter().map(parse_points).collect()
}

fn point_coords(p: &GeoPoint) -> Value {
    match p.z {
        Some(z) => json!([p.lon_deg, p.lat_deg, z]),
        None => json!([p.lon_deg, p.lat_deg]),
    }
}

fn points_coords(ps: &[GeoPoint]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, Geometry, parse_feature_collection_str, parse_geometry};
    use crate::error::ParseError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_point_with_depth() {
        let g = parse_geometry(&json!({"type": "Point", "coordinates": [-122.4, 37.8, 10.0]}))
            .unwrap();
        assert_eq!(g, Geometry::Point(GeoPoint::new(-122.4, 37.8).with_z(10.0)));
    }

    #[test]
    fn parses_line_and_polygon_rings() {
        let line = parse_geometry(&json!({
            "type": "LineString",
            "coordinates": [[0.0, 0.0], [1.0, 1.0]]
        }))
        .unwrap();
        assert_eq!(
            line,
            Geometry::LineString(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)])
        );

        let poly = parse_geometry(&json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        }))
        .unwrap();
        assert_eq!(poly.type_name(), "MultiPolygon");
        let Geometry::MultiPolygon(polys) = &poly else {
            panic!("expected MultiPolygon, got {poly:?}");
        };
        assert_eq!(polys[0][0].len(), 4);
    }

    #[test]
    fn geometry_value_keeps_type_and_depth() {
        let g = Geometry::Point(GeoPoint::new(1.0, 2.0).with_z(3.0));
        assert_eq!(
            g.to_geojson_value(),
            json!({"type": "Point", "coordinates": [1.0, 2.0, 3.0]})
        );
    }

    #[test]
    fn rejects_non_collections() {
        let err = parse_feature_collection_str(r#"{"type":"Feature"}"#).unwrap_err();
        assert!(matches!(err, ParseError::NotAFeatureCollection));

        let err = parse_feature_collection_str("{not json").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn reports_index_of_bad_feature() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}},
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":"x"}}
        ]}"#;
        match parse_feature_collection_str(payload).unwrap_err() {
            ParseError::InvalidFeature { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_geometry_and_numeric_ids() {
        let payload = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":7,"properties":null,"geometry":null}
        ]}"#;
        let features = parse_feature_collection_str(payload).unwrap();
        assert_eq!(features[0].id.as_deref(), Some("7"));
        assert!(features[0].geometry.is_none());
        assert!(features[0].properties.is_empty());
    }
}
