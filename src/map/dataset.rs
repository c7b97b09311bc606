//! GeoJSON conversion at the dataset boundary
//!
//! Parses a FeatureCollection of Point features into `Record`s and
//! serializes colored features back out. This is where null, missing and
//! empty-string properties are collapsed into a single absent value and
//! unparseable ages are dropped, so nothing downstream has to care.

use super::color_processor::DisplayFeature;
use super::error::{MapError, Result};
use super::record::Record;
use log::{info, warn};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;

/// Accepted property keys per attribute, first match wins
const ID_KEYS: &[&str] = &["id", "sample_id", "sampleId"];
const AGE_KEYS: &[&str] = &["age", "date_mean_bp", "dateMeanBp", "age_bp"];
const CULTURE_KEYS: &[&str] = &["culture", "group", "group_id"];
const Y_HAPLOGROUP_KEYS: &[&str] = &["yHaplogroup", "y_haplogroup", "y_hap"];
const MT_DNA_KEYS: &[&str] = &["mtDna", "mtdna", "mt_dna", "mtDNA"];
const Y_HAPLOTREE_KEYS: &[&str] = &["yHaplotreePath", "y_haplotree", "y_haplotree_path", "yHaplotree"];

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    features: Option<Vec<RawFeature>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Parse a GeoJSON FeatureCollection into records
///
/// Features without a Point geometry are skipped with a warning; features
/// without an id get `feature-<index>`.
pub fn parse_feature_collection(json: &str) -> Result<Vec<Record>> {
    let raw: RawCollection = serde_json::from_str(json)?;

    if let Some(kind) = raw.kind.as_deref() {
        if kind != "FeatureCollection" {
            return Err(MapError::Dataset(format!(
                "Expected a FeatureCollection, found '{}'",
                kind
            )));
        }
    }

    let features = raw
        .features
        .ok_or_else(|| MapError::Dataset("FeatureCollection has no 'features' array".to_string()))?;

    let total = features.len();
    let records: Vec<Record> = features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| feature_to_record(index, feature))
        .collect();

    if records.len() < total {
        warn!(
            "Skipped {} of {} features without a usable Point geometry",
            total - records.len(),
            total
        );
    }

    Ok(records)
}

/// Read and parse a GeoJSON dataset file
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let records = parse_feature_collection(&json)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn feature_to_record(index: usize, feature: RawFeature) -> Option<Record> {
    let (longitude, latitude) = match point_coordinates(feature.geometry.as_ref()) {
        Some(position) => position,
        None => {
            warn!("Feature {} has no Point geometry, skipping", index);
            return None;
        }
    };

    let properties = feature.properties.unwrap_or_default();

    let id = feature
        .id
        .as_ref()
        .and_then(value_to_text)
        .or_else(|| text_property(&properties, ID_KEYS))
        .unwrap_or_else(|| format!("feature-{}", index));

    Some(
        Record::new(id, longitude, latitude)
            .with_age(age_property(&properties))
            .with_culture(text_property(&properties, CULTURE_KEYS))
            .with_y_haplogroup(text_property(&properties, Y_HAPLOGROUP_KEYS))
            .with_mt_dna(text_property(&properties, MT_DNA_KEYS))
            .with_y_haplotree_path(text_property(&properties, Y_HAPLOTREE_KEYS)),
    )
}

fn point_coordinates(geometry: Option<&RawGeometry>) -> Option<(f64, f64)> {
    let geometry = geometry.filter(|g| g.kind == "Point")?;
    let coords = geometry.coordinates.as_array()?;
    let longitude = coords.first()?.as_f64()?;
    let latitude = coords.get(1)?.as_f64()?;
    if longitude.is_finite() && latitude.is_finite() {
        Some((longitude, latitude))
    } else {
        None
    }
}

/// Strings are trimmed, numbers stringified; null and blank become `None`
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_property(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(value_to_text)
}

/// Ages may arrive as numbers or numeric strings; anything else is absent
fn age_property(properties: &Map<String, Value>) -> Option<f64> {
    AGE_KEYS
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|age| age.is_finite() && *age >= 0.0)
}

#[derive(Serialize)]
struct PointView {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesView<'a> {
    id: &'a str,
    age: Option<f64>,
    culture: Option<&'a str>,
    y_haplogroup: Option<&'a str>,
    mt_dna: Option<&'a str>,
    y_haplotree_path: Option<&'a str>,
    display_color: &'a str,
}

#[derive(Serialize)]
struct FeatureView<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    geometry: PointView,
    properties: PropertiesView<'a>,
}

impl Serialize for DisplayFeature<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let record = self.record;
        let position = record.position();
        FeatureView {
            kind: "Feature",
            id: record.id(),
            geometry: PointView {
                kind: "Point",
                coordinates: [position.longitude, position.latitude],
            },
            properties: PropertiesView {
                id: record.id(),
                age: record.age(),
                culture: record.culture(),
                y_haplogroup: record.y_haplogroup(),
                mt_dna: record.mt_dna(),
                y_haplotree_path: record.y_haplotree_path(),
                display_color: &self.display_color,
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "I0001",
                "geometry": {"type": "Point", "coordinates": [37.5, 47.2]},
                "properties": {
                    "age": 5000,
                    "culture": "Yamnaya",
                    "y_haplogroup": "R1b",
                    "mtdna": "U5a1",
                    "y_haplotree": "R-M207>M173>M343>M269"
                }
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [10.0, 50.0]},
                "properties": {
                    "id": "I0002",
                    "age": "8000.5",
                    "culture": "",
                    "yHaplogroup": null,
                    "mtDna": "  "
                }
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [11.0, 51.0]},
                "properties": {"age": "unknown"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                "properties": {"id": "line"}
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {"id": "nowhere"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let records = parse_feature_collection(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.id(), "I0001");
        assert_eq!(first.position().longitude, 37.5);
        assert_eq!(first.age(), Some(5000.0));
        assert_eq!(first.culture(), Some("Yamnaya"));
        assert_eq!(first.y_haplogroup(), Some("R1b"));
        assert_eq!(first.mt_dna(), Some("U5a1"));
        assert_eq!(first.y_haplotree_path(), Some("R-M207>M173>M343>M269"));
    }

    #[test]
    fn test_absent_values_normalize() {
        let records = parse_feature_collection(SAMPLE).unwrap();
        let second = &records[1];
        assert_eq!(second.id(), "I0002");
        assert_eq!(second.age(), Some(8000.5));
        assert_eq!(second.culture(), None);
        assert_eq!(second.y_haplogroup(), None);
        assert_eq!(second.mt_dna(), None);
        assert_eq!(second.y_haplotree_path(), None);
    }

    #[test]
    fn test_malformed_age_is_absent_and_id_generated() {
        let records = parse_feature_collection(SAMPLE).unwrap();
        assert_eq!(records[2].id(), "feature-2");
        assert_eq!(records[2].age(), None);
    }

    #[test]
    fn test_rejects_non_collections() {
        let err = parse_feature_collection(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, MapError::Dataset(_)));
        let err = parse_feature_collection("not json").unwrap_err();
        assert!(matches!(err, MapError::Json(_)));
    }

    #[test]
    fn test_display_feature_serialization() {
        let record = Record::new("I0001", 37.5, 47.2)
            .with_age(Some(5000.0))
            .with_culture(Some("Yamnaya"));
        let feature = DisplayFeature {
            record: &record,
            display_color: "#440154".to_string(),
        };
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["coordinates"][0], 37.5);
        assert_eq!(value["properties"]["culture"], "Yamnaya");
        assert_eq!(value["properties"]["displayColor"], "#440154");
        assert!(value["properties"]["mtDna"].is_null());
    }
}
