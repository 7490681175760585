//! World-boundary feature collection.
//!
//! The map file is a GeoJSON-style FeatureCollection. The backend never
//! touches geometry (that is the rendering surface's job); the only thing it
//! needs from each feature is the `name` property the client sends back when
//! a region is clicked. `extract_country_name` is the single typed accessor
//! for that lookup, validated once at load time.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::dataset::LoadError;

#[derive(Debug, Deserialize)]
pub struct WorldMap {
  pub features: Vec<Feature>,
}

/// Geometry is never read here, so deserialization just drops it.
#[derive(Debug, Deserialize)]
pub struct Feature {
  #[serde(default)]
  pub properties: Value,
}

/// The map-side country identifier of a feature, if it carries one.
pub fn extract_country_name(feature: &Feature) -> Option<&str> {
  feature
    .properties
    .get("name")
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|name| !name.is_empty())
}

/// Read the world-boundary file and return the clickable country names.
/// Features without a usable `name` are skipped with a warning; an entirely
/// nameless collection is a schema failure.
pub async fn load_world(path: &str) -> Result<Vec<String>, LoadError> {
  let raw = tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
    path: path.to_string(),
    source,
  })?;
  parse_world(&raw, path)
}

pub fn parse_world(raw: &str, origin: &str) -> Result<Vec<String>, LoadError> {
  let world: WorldMap = serde_json::from_str(raw).map_err(|source| LoadError::Parse {
    path: origin.to_string(),
    source,
  })?;

  let mut names = Vec::with_capacity(world.features.len());
  let mut nameless = 0usize;
  for feature in &world.features {
    match extract_country_name(feature) {
      Some(name) => names.push(name.to_string()),
      None => nameless += 1,
    }
  }
  if nameless > 0 {
    warn!(target: "dataset", %origin, nameless, "World features without a `name` property were skipped");
  }
  if names.is_empty() {
    return Err(LoadError::Schema {
      path: origin.to_string(),
      violations: vec!["no feature carries a non-empty `name` property".into()],
    });
  }
  Ok(names)
}

#[cfg(test)]
mod tests {
  use super::*;

  const WORLD: &str = r#"{
    "type": "FeatureCollection",
    "features": [
      {"type": "Feature", "properties": {"name": "France"}, "geometry": {"type": "Polygon", "coordinates": []}},
      {"type": "Feature", "properties": {"name": "  Germany "}, "geometry": null},
      {"type": "Feature", "properties": {"iso": "XX"}, "geometry": null},
      {"type": "Feature", "properties": {"name": ""}, "geometry": null}
    ]
  }"#;

  #[test]
  fn extracts_trimmed_names_and_skips_nameless() {
    let names = parse_world(WORLD, "world.json").unwrap();
    assert_eq!(names, ["France", "Germany"]);
  }

  #[test]
  fn nameless_collection_is_a_schema_error() {
    let raw = r#"{"features": [{"properties": {}, "geometry": null}]}"#;
    let err = parse_world(raw, "world.json").unwrap_err();
    assert!(matches!(err, LoadError::Schema { .. }));
  }

  #[test]
  fn non_string_name_is_ignored() {
    let feature: Feature =
      serde_json::from_str(r#"{"properties": {"name": 42}, "geometry": null}"#).unwrap();
    assert_eq!(extract_country_name(&feature), None);
  }
}
