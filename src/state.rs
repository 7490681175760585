//! Application state: the read-only dataset, the world-boundary name list,
//! and the in-memory session store.
//!
//! Dataset and map names are immutable after load. Each `Session` is owned by
//! exactly one client (a WebSocket connection, or whoever holds the HTTP
//! session id) and is only ever mutated under the store's write lock.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::dataset::{load_dataset, LoadError};
use crate::domain::{AnswerOutcome, CountryRecord, Question, QuizFilters, SessionMetrics, UsedImageLedger};
use crate::logic::names_match;
use crate::worldmap::load_world;

/// Per-session phase of the quiz loop. `Loading`/`Error` from the original
/// page lifecycle map to process startup here: a session only exists once
/// both data files are loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// A question is active and unanswered.
    Ready,
    /// The active question has been answered; waiting for the next request.
    Answered,
    /// The current filters yield no qualifying record; no question is held.
    NoCandidates,
}

/// The question currently shown, plus the recorded first answer (if any).
#[derive(Clone, Debug)]
pub struct ActiveQuestion {
    pub question: Question,
    pub outcome: Option<AnswerOutcome>,
}

/// One quiz session. Runs until the client goes away; never reaches a
/// terminal state of its own.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub filters: QuizFilters,
    pub metrics: SessionMetrics,
    pub ledger: UsedImageLedger,
    pub active: Option<ActiveQuestion>,
    /// Country of the previous question, so the next pick can avoid it.
    pub last_country: Option<String>,
}

impl Session {
    pub fn new(id: String, filters: QuizFilters) -> Self {
        Self {
            id,
            filters,
            metrics: SessionMetrics::default(),
            ledger: UsedImageLedger::new(),
            active: None,
            last_country: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.active {
            None => SessionPhase::NoCandidates,
            Some(active) if active.outcome.is_some() => SessionPhase::Answered,
            Some(_) => SessionPhase::Ready,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<CountryRecord>>,
    pub world_names: Arc<Vec<String>>,
    pub cfg: QuizConfig,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AppState {
    /// Fetch and validate both data files (concurrently; either failure
    /// aborts), then build the shared state.
    #[instrument(level = "info", skip_all, fields(dataset = %cfg.dataset_path, world = %cfg.world_path))]
    pub async fn load(cfg: QuizConfig) -> Result<Self, LoadError> {
        let (records, world_names) =
            tokio::join!(load_dataset(&cfg.dataset_path), load_world(&cfg.world_path));
        let state = Self::from_parts(records?, world_names?, cfg);
        state.log_inventory();
        Ok(state)
    }

    /// Build state from already-loaded data. Used by `load` and by tests.
    pub fn from_parts(records: Vec<CountryRecord>, world_names: Vec<String>, cfg: QuizConfig) -> Self {
        Self {
            records: Arc::new(records),
            world_names: Arc::new(world_names),
            cfg,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Startup inventory by region, plus a warning for every dataset country
    /// that no map feature name matches under the active match mode (those
    /// questions would be unanswerable by clicking).
    fn log_inventory(&self) {
        let mut count_by_region: HashMap<&str, usize> = HashMap::new();
        for record in self.records.iter() {
            let region = if record.region.is_empty() { "(unset)" } else { &record.region };
            *count_by_region.entry(region).or_insert(0) += 1;
        }
        for (region, countries) in count_by_region {
            info!(target: "quiz", %region, countries, "Startup dataset inventory");
        }

        for record in self.records.iter() {
            let clickable = self
                .world_names
                .iter()
                .any(|name| names_match(name, &record.country, self.cfg.match_mode));
            if !clickable {
                warn!(target: "quiz", country = %record.country, "No world feature matches this dataset country; its questions cannot be answered");
            }
        }
    }

    /// Create a session with the configured default clue count and register it.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let filters = QuizFilters {
            clue_count: Some(self.cfg.default_clue_count),
            ..Default::default()
        };
        let session = Session::new(id.clone(), filters);
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "quiz", session = %id, "Session created");
        id
    }

    /// Run `f` against the session, if it still exists. Late messages for a
    /// disposed/unknown session get `None` instead of touching any state.
    pub async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(f)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            info!(target: "quiz", session = %id, "Session removed");
        }
    }

    /// Number of live sessions (diagnostics).
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
