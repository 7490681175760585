//! Dataset filtering: which country records can yield a valid question under
//! the active constraints.

use crate::domain::{CountryRecord, QuizFilters, SamplingMode};

/// Usable clue images of a record merged by clue type: one group per
/// distinct type (case-insensitive, like the type filter), images
/// concatenated in item order. A record may legally carry several items with
/// the same type label; per-type counting and sampling must treat them as
/// one type.
pub struct ClueGroup<'a> {
  pub clue_type: &'a str,
  pub images: Vec<&'a str>,
}

pub fn clue_type_groups<'a>(record: &'a CountryRecord, filters: &QuizFilters) -> Vec<ClueGroup<'a>> {
  let mut groups: Vec<ClueGroup<'a>> = Vec::new();
  for item in &record.items {
    if !item.has_images() || !filters.matches_type(&item.clue_type) {
      continue;
    }
    match groups
      .iter_mut()
      .find(|g| g.clue_type.eq_ignore_ascii_case(&item.clue_type))
    {
      Some(group) => group.images.extend(item.images.iter().map(String::as_str)),
      None => groups.push(ClueGroup {
        clue_type: &item.clue_type,
        images: item.images.iter().map(String::as_str).collect(),
      }),
    }
  }
  groups
}

/// Number of clues a record can contribute under `filters`.
///
/// Per-type mode counts distinct clue types with at least one image (one clue
/// is drawn per type). Pooled mode counts every image of the requested type
/// (several clues may share a type). Items without images never count.
pub fn available_clues(record: &CountryRecord, filters: &QuizFilters) -> usize {
  match filters.mode() {
    SamplingMode::PerType => clue_type_groups(record, filters).len(),
    SamplingMode::Pooled => record
      .items
      .iter()
      .filter(|item| item.has_images() && filters.matches_type(&item.clue_type))
      .map(|item| item.images.len())
      .sum(),
  }
}

/// True when `record` qualifies as a question candidate.
pub fn qualifies(record: &CountryRecord, filters: &QuizFilters) -> bool {
  if let Some(region) = &filters.region {
    if &record.region != region {
      return false;
    }
  }
  available_clues(record, filters) >= filters.clue_count()
}

/// The subset of `records` that can yield a valid question. An empty result
/// is a normal outcome (filters too narrow), not an error.
pub fn candidates<'a>(records: &'a [CountryRecord], filters: &QuizFilters) -> Vec<&'a CountryRecord> {
  records.iter().filter(|r| qualifies(r, filters)).collect()
}
