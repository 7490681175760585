//! Quiz configuration loaded from TOML (optional) with env-driven discovery.
//!
//! See `QuizConfig` for the expected schema. Every field has a default so the
//! server runs with no config file at all.

use serde::Deserialize;
use tracing::{error, info};

/// How a clicked map name is compared against the expected answer.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
  /// Byte-for-byte string equality. Only safe when the dataset and the map
  /// file share one naming vocabulary.
  Exact,
  /// Compare canonical keys (diacritics/casing/alias tolerant).
  #[default]
  Normalized,
}

/// Lifetime of the used-image ledger.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerScope {
  /// Ledger persists for the whole session, across filter changes.
  #[default]
  Session,
  /// Ledger is cleared whenever the filter set changes.
  Filters,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
  /// Path of the CountryRecord JSON array.
  pub dataset_path: String,
  /// Path of the world-boundary feature collection.
  pub world_path: String,
  /// Clue count used when a session does not request one.
  pub default_clue_count: usize,
  pub match_mode: MatchMode,
  /// Strict variant resets score/streak when filters change.
  pub reset_metrics_on_filter_change: bool,
  pub ledger_scope: LedgerScope,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      dataset_path: "./data/countries.json".into(),
      world_path: "./data/world.json".into(),
      default_clue_count: 3,
      match_mode: MatchMode::Normalized,
      reset_metrics_on_filter_change: true,
      ledger_scope: LedgerScope::Session,
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, logs and returns None (the caller falls back to defaults).
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "plonk_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "plonk_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "plonk_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
