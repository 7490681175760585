//! Directory-to-dataset compiler.
//!
//! Batch collaborator of the quiz: scans an image tree laid out as
//! `<country-folder>/<file>`, derives each image's clue type from its
//! filename (trailing numeric counters stripped, "bollard_12.jpg" → type
//! "bollard"), groups by country then type, and emits the CountryRecord
//! array sorted by country then type. `region` is left blank for manual
//! fill-in. Output is deterministic for a fixed tree.
//!
//! The grouping core is pure; only `scan_image_tree` touches the filesystem.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::{ClueItem, CountryRecord};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Derive the clue type from an image filename: drop the extension, strip a
/// trailing numeric counter and its `_`/`-`/space separator, lowercase.
/// Falls back to the whole stem when stripping would leave nothing
/// ("42.jpg" keeps type "42").
pub fn clue_type_from_filename(file_name: &str) -> String {
  let stem = match file_name.rsplit_once('.') {
    Some((stem, _ext)) if !stem.is_empty() => stem,
    _ => file_name,
  };
  let without_counter = stem
    .trim_end_matches(|c: char| c.is_ascii_digit())
    .trim_end_matches(['_', '-', ' ']);
  let base = if without_counter.is_empty() { stem } else { without_counter };
  base.to_lowercase()
}

/// True for files the compiler treats as clue images.
pub fn is_image_file(file_name: &str) -> bool {
  if file_name.starts_with('.') {
    return false;
  }
  match file_name.rsplit_once('.') {
    Some((_, ext)) => IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)),
    None => false,
  }
}

/// Group (country, filename) entries into the dataset shape: records sorted
/// by country, items sorted by type, image paths sorted within each item.
pub fn compile_records<I>(entries: I) -> Vec<CountryRecord>
where
  I: IntoIterator<Item = (String, String)>,
{
  let mut by_country: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
  for (country, file_name) in entries {
    let clue_type = clue_type_from_filename(&file_name);
    by_country
      .entry(country.clone())
      .or_default()
      .entry(clue_type)
      .or_default()
      .push(format!("{country}/{file_name}"));
  }

  by_country
    .into_iter()
    .map(|(country, types)| CountryRecord {
      country,
      region: String::new(),
      items: types
        .into_iter()
        .map(|(clue_type, mut images)| {
          images.sort();
          ClueItem { clue_type, images }
        })
        .collect(),
    })
    .collect()
}

/// Walk `<root>/<country>/<file>` and collect image entries. Hidden files,
/// non-image extensions and anything outside the two-level layout are
/// skipped (with a debug/warn trace), never an error.
pub fn scan_image_tree(root: &Path) -> io::Result<Vec<(String, String)>> {
  let mut entries = Vec::new();
  for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
    let entry = entry.map_err(io::Error::from)?;
    if !entry.file_type().is_file() {
      continue;
    }
    let Some(file_name) = entry.file_name().to_str() else {
      warn!(target: "dataset", path = %entry.path().display(), "Skipping non-UTF-8 filename");
      continue;
    };
    if !is_image_file(file_name) {
      debug!(target: "dataset", path = %entry.path().display(), "Skipping non-image file");
      continue;
    }
    let country = entry
      .path()
      .parent()
      .and_then(Path::file_name)
      .and_then(|n| n.to_str());
    let Some(country) = country else {
      warn!(target: "dataset", path = %entry.path().display(), "Skipping file with unreadable country folder");
      continue;
    };
    entries.push((country.to_string(), file_name.to_string()));
  }
  Ok(entries)
}
