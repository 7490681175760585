//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::logic::{advance_question, apply_filters, cleared_filters, ensure_question, evaluate_answer, AnswerReply};
use crate::protocol::*;
use crate::state::{AppState, Session};

fn round_out(session: &Session) -> RoundOut {
  RoundOut {
    phase: session.phase(),
    question: session.active.as_ref().map(|a| to_out(&a.question)),
    filters: session.filters.clone(),
    metrics: session.metrics,
  }
}

fn unknown_session(session_id: &str) -> Response {
  (
    StatusCode::NOT_FOUND,
    Json(serde_json::json!({ "error": format!("Unknown sessionId: {session_id}") })),
  )
    .into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

/// Create a session and build its first question (or land in NoCandidates
/// when the dataset cannot satisfy the default constraints). The first
/// GET /question serves that round; nothing is drawn twice.
#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<AppState>) -> impl IntoResponse {
  let session_id = state.create_session().await;
  let records = state.records.clone();
  state
    .with_session(&session_id, |session| {
      let mut rng = rand::thread_rng();
      advance_question(session, &records, &mut rng);
    })
    .await;
  info!(target: "quiz", session = %session_id, "HTTP session created");
  Json(SessionCreatedOut { session_id })
}

/// Return the pending round if one is unanswered, otherwise advance to the
/// next question.
#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_next_question(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> Response {
  let records = state.records.clone();
  let round = state
    .with_session(&q.session_id, |session| {
      let mut rng = rand::thread_rng();
      ensure_question(session, &records, &mut rng);
      round_out(session)
    })
    .await;
  match round {
    Some(round) => {
      info!(target: "quiz", session = %q.session_id, phase = ?round.phase, "HTTP question served");
      Json(round).into_response()
    }
    None => unknown_session(&q.session_id),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, clicked = %body.country))]
pub async fn http_post_answer(
  State(state): State<AppState>,
  Json(body): Json<AnswerIn>,
) -> Response {
  let mode = state.cfg.match_mode;
  let reply = state
    .with_session(&body.session_id, |session| {
      let reply = evaluate_answer(session, &body.country, mode);
      (reply, session.metrics)
    })
    .await;
  let Some((reply, metrics)) = reply else {
    return unknown_session(&body.session_id);
  };

  let (outcome, already_answered) = match reply {
    AnswerReply::Evaluated(outcome) => (outcome, false),
    AnswerReply::Replayed(outcome) => (outcome, true),
    AnswerReply::NoActiveQuestion => {
      return (
        StatusCode::CONFLICT,
        Json(serde_json::json!({ "error": "No active question for this session" })),
      )
        .into_response();
    }
  };
  info!(target: "quiz", session = %body.session_id, correct = outcome.correct, already_answered, "HTTP answer evaluated");
  Json(AnswerOut {
    correct: outcome.correct,
    clicked: outcome.clicked,
    correct_country: outcome.correct_country,
    metrics,
    already_answered,
  })
  .into_response()
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_filters(
  State(state): State<AppState>,
  Json(body): Json<FiltersIn>,
) -> Response {
  let records = state.records.clone();
  let cfg = state.cfg.clone();
  let filters = crate::domain::QuizFilters {
    region: body.region,
    clue_type: body.clue_type,
    clue_count: body.clue_count.or(Some(cfg.default_clue_count)),
  };
  let round = state
    .with_session(&body.session_id, |session| {
      let mut rng = rand::thread_rng();
      apply_filters(session, &records, filters, &cfg, &mut rng);
      round_out(session)
    })
    .await;
  match round {
    Some(round) => {
      info!(target: "quiz", session = %body.session_id, phase = ?round.phase, "HTTP filters applied");
      Json(round).into_response()
    }
    None => unknown_session(&body.session_id),
  }
}

/// The "clear filters" affordance paired with the NoCandidates state.
#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_clear_filters(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> Response {
  let records = state.records.clone();
  let cfg = state.cfg.clone();
  let round = state
    .with_session(&q.session_id, |session| {
      let mut rng = rand::thread_rng();
      apply_filters(session, &records, cleared_filters(&cfg), &cfg, &mut rng);
      round_out(session)
    })
    .await;
  match round {
    Some(round) => Json(round).into_response(),
    None => unknown_session(&q.session_id),
  }
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_metrics(
  State(state): State<AppState>,
  Query(q): Query<SessionQuery>,
) -> Response {
  let metrics = state.with_session(&q.session_id, |session| session.metrics).await;
  match metrics {
    Some(metrics) => Json(MetricsOut { metrics }).into_response(),
    None => unknown_session(&q.session_id),
  }
}
