//! Dataset loading and schema validation.
//!
//! The dataset is a JSON array of `CountryRecord`. Parsing and validation
//! failures surface one human-readable error that enumerates every violated
//! field instead of stopping at the first; startup either gets a fully valid
//! dataset or a message the operator can act on.

use thiserror::Error;
use tracing::info;

use crate::domain::CountryRecord;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse {path} as JSON: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("{path} violates the dataset schema:\n  - {}", .violations.join("\n  - "))]
  Schema { path: String, violations: Vec<String> },
}

/// Read and validate the dataset file.
pub async fn load_dataset(path: &str) -> Result<Vec<CountryRecord>, LoadError> {
  let raw = tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
    path: path.to_string(),
    source,
  })?;
  let records = parse_dataset(&raw, path)?;
  let image_total: usize = records
    .iter()
    .flat_map(|r| r.items.iter())
    .map(|i| i.images.len())
    .sum();
  info!(target: "dataset", %path, countries = records.len(), images = image_total, "Dataset loaded");
  Ok(records)
}

/// Parse and validate dataset JSON. `origin` only labels error messages.
pub fn parse_dataset(raw: &str, origin: &str) -> Result<Vec<CountryRecord>, LoadError> {
  let records: Vec<CountryRecord> = serde_json::from_str(raw).map_err(|source| LoadError::Parse {
    path: origin.to_string(),
    source,
  })?;
  let violations = schema_violations(&records);
  if violations.is_empty() {
    Ok(records)
  } else {
    Err(LoadError::Schema {
      path: origin.to_string(),
      violations,
    })
  }
}

/// All structural contract violations of an already-parsed dataset.
pub fn schema_violations(records: &[CountryRecord]) -> Vec<String> {
  let mut violations = Vec::new();
  for (ri, record) in records.iter().enumerate() {
    let who = if record.country.is_empty() {
      format!("record #{ri}")
    } else {
      format!("record #{ri} ({})", record.country)
    };
    if record.country.trim().is_empty() {
      violations.push(format!("{who}: `country` must be a non-empty string"));
    }
    if record.items.is_empty() {
      violations.push(format!("{who}: `items` must be a non-empty array"));
    }
    for (ii, item) in record.items.iter().enumerate() {
      if item.clue_type.trim().is_empty() {
        violations.push(format!("{who}: items[{ii}].type must be a non-empty string"));
      }
      if item.images.is_empty() {
        violations.push(format!("{who}: items[{ii}].images must be a non-empty array"));
      }
      for (gi, url) in item.images.iter().enumerate() {
        if url.trim().is_empty() {
          violations.push(format!("{who}: items[{ii}].images[{gi}] must be a non-empty string"));
        }
      }
    }
  }
  violations
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn valid_dataset_parses() {
    let raw = r#"[
      {"country": "France", "region": "Europe", "items": [
        {"type": "bollard", "images": ["a.jpg", "b.jpg"]},
        {"type": "pole", "images": ["c.jpg"]}
      ]},
      {"country": "Japan", "items": [
        {"type": "pole", "images": ["d.jpg"]}
      ]}
    ]"#;
    let records = parse_dataset(raw, "inline").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].items[0].clue_type, "bollard");
    // `region` is optional and defaults to empty.
    assert_eq!(records[1].region, "");
  }

  #[test]
  fn malformed_json_is_a_parse_error() {
    let err = parse_dataset("not json", "inline").unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
  }

  #[test]
  fn schema_errors_are_aggregated_not_first_only() {
    let raw = r#"[
      {"country": "", "items": []},
      {"country": "France", "items": [
        {"type": "", "images": []},
        {"type": "pole", "images": [""]}
      ]}
    ]"#;
    let err = parse_dataset(raw, "inline").unwrap_err();
    let LoadError::Schema { violations, .. } = err else {
      panic!("expected schema error, got {err}");
    };
    // One message per violated field: empty country, empty items, empty
    // type, empty images array, empty image string.
    assert_eq!(violations.len(), 5);
    let rendered = violations.join("\n");
    assert!(rendered.contains("`country`"));
    assert!(rendered.contains("items[0].type"));
    assert!(rendered.contains("items[1].images[0]"));
  }

  #[test]
  fn schema_error_message_is_human_readable() {
    let raw = r#"[{"country": "France", "items": []}]"#;
    let err = parse_dataset(raw, "countries.json").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("countries.json"));
    assert!(msg.contains("record #0 (France)"));
  }
}
