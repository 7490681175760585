//! Core quiz behaviors shared by the HTTP and WebSocket handlers:
//! answer evaluation (with the double-answer guard), question advancement
//! and filter changes. Everything here is synchronous and side-effect-free
//! beyond the session passed in, which keeps the engine testable without a
//! server or an ambient RNG.

use rand::Rng;
use tracing::debug;

use crate::config::{LedgerScope, MatchMode, QuizConfig};
use crate::domain::{AnswerOutcome, CountryRecord, Question, QuizFilters, SessionMetrics};
use crate::filter::candidates;
use crate::normalize::canonical_key;
use crate::sampler::{pick_candidate, sample_question};
use crate::state::{ActiveQuestion, Session};

/// Compare a clicked map name against the expected answer.
pub fn names_match(clicked: &str, expected: &str, mode: MatchMode) -> bool {
  match mode {
    MatchMode::Exact => clicked == expected,
    MatchMode::Normalized => canonical_key(clicked) == canonical_key(expected),
  }
}

/// What an answer submission produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerReply {
  /// First answer for this question; metrics were updated.
  Evaluated(AnswerOutcome),
  /// The question was already answered; nothing changed, the recorded
  /// outcome is replayed.
  Replayed(AnswerOutcome),
  /// No question is active (NoCandidates phase).
  NoActiveQuestion,
}

/// Evaluate a clicked country against the active question.
///
/// First answer: correct adds to score and streak, incorrect resets the
/// streak, both count as answered. Any later click on the same question
/// instance is a no-op on the metrics.
pub fn evaluate_answer(session: &mut Session, clicked: &str, mode: MatchMode) -> AnswerReply {
  let Some(active) = session.active.as_mut() else {
    return AnswerReply::NoActiveQuestion;
  };
  if let Some(outcome) = &active.outcome {
    debug!(target: "quiz", session = %session.id, "Answer ignored: question already answered");
    return AnswerReply::Replayed(outcome.clone());
  }

  let correct = names_match(clicked, &active.question.correct_country, mode);
  session.metrics.answered += 1;
  if correct {
    session.metrics.score += 1;
    session.metrics.streak += 1;
  } else {
    session.metrics.streak = 0;
  }

  let outcome = AnswerOutcome {
    clicked: clicked.to_string(),
    correct,
    correct_country: active.question.correct_country.clone(),
  };
  active.outcome = Some(outcome.clone());
  AnswerReply::Evaluated(outcome)
}

/// Replace the active question with a freshly sampled one, or clear it when
/// the filters yield no candidate (NoCandidates is a normal outcome).
pub fn advance_question<R: Rng + ?Sized>(
  session: &mut Session,
  records: &[CountryRecord],
  rng: &mut R,
) -> Option<Question> {
  let pool = candidates(records, &session.filters);
  let Some(record) = pick_candidate(&pool, session.last_country.as_deref(), rng) else {
    session.active = None;
    return None;
  };
  match sample_question(record, &session.filters, &mut session.ledger, rng) {
    Some(question) => {
      session.last_country = Some(question.correct_country.clone());
      session.active = Some(ActiveQuestion {
        question: question.clone(),
        outcome: None,
      });
      Some(question)
    }
    // Unreachable for a record that passed the filter; treat as no candidate.
    None => {
      session.active = None;
      None
    }
  }
}

/// The round a client request for a question should see: the active
/// unanswered question when one is held, a freshly advanced one otherwise.
/// Keeps a question no one has answered yet from being thrown away (its
/// ledger marks and last-country slot are already spent).
pub fn ensure_question<R: Rng + ?Sized>(
  session: &mut Session,
  records: &[CountryRecord],
  rng: &mut R,
) -> Option<Question> {
  if let Some(active) = &session.active {
    if active.outcome.is_none() {
      return Some(active.question.clone());
    }
  }
  advance_question(session, records, rng)
}

/// Install a new filter set and advance to the next question under it.
/// Policy knobs: the strict variant resets the metrics on any change, and a
/// filter-scoped ledger starts a fresh no-repeat cycle.
pub fn apply_filters<R: Rng + ?Sized>(
  session: &mut Session,
  records: &[CountryRecord],
  filters: QuizFilters,
  cfg: &QuizConfig,
  rng: &mut R,
) -> Option<Question> {
  let changed = session.filters != filters;
  session.filters = filters;
  if changed {
    if cfg.reset_metrics_on_filter_change {
      session.metrics = SessionMetrics::default();
    }
    if cfg.ledger_scope == LedgerScope::Filters {
      session.ledger.clear();
    }
  }
  advance_question(session, records, rng)
}

/// The unconstrained filter set (keeps the configured clue count).
pub fn cleared_filters(cfg: &QuizConfig) -> QuizFilters {
  QuizFilters {
    clue_count: Some(cfg.default_clue_count),
    ..Default::default()
  }
}
