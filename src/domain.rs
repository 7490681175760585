//! Domain models used by the backend: country records, clue items, questions,
//! session metrics, filters and the used-image ledger.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One country entry of the quiz dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CountryRecord {
  /// Display name, also the expected answer for questions built from this record.
  pub country: String,
  /// Continent/region grouping; may be empty when not yet curated.
  #[serde(default)]
  pub region: String,
  pub items: Vec<ClueItem>,
}

/// One clue category of a country (e.g. "bollard") with its reference images.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClueItem {
  #[serde(rename = "type")]
  pub clue_type: String,
  pub images: Vec<String>,
}

impl ClueItem {
  pub fn has_images(&self) -> bool {
    !self.images.is_empty()
  }
}

/// One sampled clue delivered to the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionImage {
  pub url: String,
  #[serde(rename = "type")]
  pub clue_type: String,
}

/// One round of the quiz. Built fresh for each round, immutable afterwards,
/// replaced when the next question is requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub correct_country: String,
  pub images: Vec<QuestionImage>,
}

/// Score/streak counters of one session. Mutated only by answer evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
  pub score: u32,
  pub answered: u32,
  pub streak: u32,
}

/// Result of evaluating one click against the active question. Recorded on
/// the question so repeated clicks replay it instead of re-scoring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
  pub clicked: String,
  pub correct: bool,
  pub correct_country: String,
}

/// How question images are drawn from a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingMode {
  /// One image per distinct clue type, no type repeats.
  PerType,
  /// All images of the requested type pooled together; type repeats allowed.
  Pooled,
}

/// Active filter constraints. A `clue_type` switches sampling to pooled mode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizFilters {
  #[serde(default)]
  pub region: Option<String>,
  #[serde(default)]
  pub clue_type: Option<String>,
  #[serde(default)]
  pub clue_count: Option<usize>,
}

pub const DEFAULT_CLUE_COUNT: usize = 3;

impl QuizFilters {
  pub fn mode(&self) -> SamplingMode {
    if self.clue_type.is_some() {
      SamplingMode::Pooled
    } else {
      SamplingMode::PerType
    }
  }

  pub fn clue_count(&self) -> usize {
    self.clue_count.unwrap_or(DEFAULT_CLUE_COUNT)
  }

  /// True when an item's clue type passes the (case-insensitive) type filter.
  pub fn matches_type(&self, clue_type: &str) -> bool {
    match &self.clue_type {
      Some(t) => t.eq_ignore_ascii_case(clue_type),
      None => true,
    }
  }
}

/// Per-country, per-clue-type record of already-shown image URLs, used to
/// avoid re-issuing an image until all images of that type have been shown
/// once. Explicitly owned by the session and passed into the sampler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsedImageLedger {
  used: HashMap<String, HashMap<String, HashSet<String>>>,
}

impl UsedImageLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// URLs already shown for (country, clue type). `None` when none yet.
  pub fn used_for(&self, country: &str, clue_type: &str) -> Option<&HashSet<String>> {
    self.used.get(country).and_then(|types| types.get(clue_type))
  }

  pub fn mark_used(&mut self, country: &str, clue_type: &str, url: &str) {
    self
      .used
      .entry(country.to_string())
      .or_default()
      .entry(clue_type.to_string())
      .or_default()
      .insert(url.to_string());
  }

  /// Start a fresh cycle for one (country, clue type) pair once its images
  /// have been exhausted.
  pub fn reset_type(&mut self, country: &str, clue_type: &str) {
    if let Some(types) = self.used.get_mut(country) {
      types.remove(clue_type);
    }
  }

  pub fn clear(&mut self) {
    self.used.clear();
  }
}
