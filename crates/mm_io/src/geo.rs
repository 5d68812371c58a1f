//! GeoJSON boundaries: keyed legacy-unit collections in, one Feature per
//! merged constituency out.

use std::path::{Path, PathBuf};

use geo_types::{Geometry, MultiPolygon};
use geojson::{Feature, GeoJson, JsonObject, JsonValue};
use tracing::debug;

use crate::canonical_json::write_canonical_file;
use crate::loader::read_text;
use crate::IoError;

fn geojson_err(path: &Path, msg: impl std::fmt::Display) -> IoError {
    IoError::GeoJson {
        file: path.display().to_string(),
        msg: msg.to_string(),
    }
}

/// Read a FeatureCollection of (Multi)Polygons keyed by the string or integer
/// property `id_property`. Returned in file order.
pub fn read_keyed_collection(
    path: &Path,
    id_property: &str,
) -> Result<Vec<(String, MultiPolygon<f64>)>, IoError> {
    let text = read_text(path)?;
    let gj: GeoJson = text.parse().map_err(|e| geojson_err(path, e))?;
    let fc = match gj {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(geojson_err(path, "expected a FeatureCollection")),
    };

    let mut out = Vec::with_capacity(fc.features.len());
    for (i, feature) in fc.features.into_iter().enumerate() {
        let id = match feature.property(id_property) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => {
                return Err(geojson_err(
                    path,
                    format!("feature {i}: missing string property {id_property:?}"),
                ))
            }
        };
        let geometry = feature
            .geometry
            .ok_or_else(|| geojson_err(path, format!("feature {id}: no geometry")))?;
        let shape = Geometry::<f64>::try_from(geometry).map_err(|e| geojson_err(path, format!("feature {id}: {e}")))?;
        let polys = match shape {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            _ => {
                return Err(geojson_err(
                    path,
                    format!("feature {id}: geometry is not a Polygon or MultiPolygon"),
                ))
            }
        };
        out.push((id, polys));
    }
    debug!(file = %path.display(), property = id_property, features = out.len(), "read boundary collection");
    Ok(out)
}

/// `<dir>/<name>.geojson`; names that would escape `dir` are rejected.
pub fn boundary_path(dir: &Path, name: &str) -> Result<PathBuf, IoError> {
    let bad = name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(IoError::Invalid(format!(
            "constituency name {name:?} cannot be used as a file name"
        )));
    }
    Ok(dir.join(format!("{name}.geojson")))
}

/// Write one Feature whose only property is `name`.
pub fn write_boundary_feature(dir: &Path, name: &str, geometry: &MultiPolygon<f64>) -> Result<PathBuf, IoError> {
    let path = boundary_path(dir, name)?;

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::String(name.to_string()));
    let feature = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };

    write_canonical_file(&path, &feature)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;
    use std::io::Write;

    fn collection(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;

    #[test]
    fn reads_string_and_numeric_ids() {
        let f = collection(&format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{"CODE":"E1"}},"geometry":{SQUARE}}},
                {{"type":"Feature","properties":{{"CODE":7}},"geometry":{SQUARE}}}
            ]}}"#
        ));
        let got = read_keyed_collection(f.path(), "CODE").unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, "E1");
        assert_eq!(got[1].0, "7");
        assert_eq!(got[0].1 .0.len(), 1);
    }

    #[test]
    fn missing_key_or_wrong_type_fails() {
        let f = collection(&format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{"PC_ID":"N1"}},"geometry":{SQUARE}}}
            ]}}"#
        ));
        assert!(matches!(read_keyed_collection(f.path(), "CODE"), Err(IoError::GeoJson { .. })));

        let f = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"CODE":"E1"},"geometry":{"type":"Point","coordinates":[0,0]}}
            ]}"#,
        );
        assert!(matches!(read_keyed_collection(f.path(), "CODE"), Err(IoError::GeoJson { .. })));
    }

    #[test]
    fn written_feature_names_itself() {
        let dir = tempfile::tempdir().unwrap();
        let mp = MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)]]);
        let path = write_boundary_feature(dir.path(), "Foo Bar", &mp).unwrap();
        assert!(path.ends_with("Foo Bar.geojson"));

        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["type"], "Feature");
        assert_eq!(v["properties"], serde_json::json!({"name": "Foo Bar"}));
        assert_eq!(v["geometry"]["type"], "MultiPolygon");
    }

    #[test]
    fn path_like_names_are_rejected() {
        assert!(boundary_path(Path::new("out"), "../x").is_err());
        assert!(boundary_path(Path::new("out"), "..").is_err());
        assert!(boundary_path(Path::new("out"), "Ok Name").is_ok());
    }
}
