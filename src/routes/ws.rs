//! WebSocket upgrade + message loop. Each connection owns one quiz session:
//! the session is created on upgrade, fed by parsed JSON messages, and
//! removed when the socket closes (late messages for a gone session never
//! touch state).

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::domain::QuizFilters;
use crate::logic::{advance_question, apply_filters, cleared_filters, evaluate_answer, AnswerReply};
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
  info!(target: "plonk_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: AppState) {
  let session_id = state.create_session().await;
  info!(target: "plonk_backend", session = %session_id, "WebSocket connected");

  // Announce the session, then build and push the first round.
  let hello = ServerWsMessage::SessionStarted {
    session_id: session_id.clone(),
  };
  if send_ws(&mut socket, &hello).await.is_err() {
    state.remove_session(&session_id).await;
    return;
  }
  let first = next_round(&state, &session_id).await;
  if send_ws(&mut socket, &first).await.is_err() {
    state.remove_session(&session_id).await;
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "plonk_backend", session = %session_id, msg = %trunc_for_log(&txt, 200), "WS received");
            handle_client_ws(incoming, &state, &session_id).await
          }
          Err(e) => ServerWsMessage::Error {
            message: format!("Invalid JSON: {}", e),
          },
        };

        if let Err(e) = send_ws(&mut socket, &reply_msg).await {
          error!(target: "plonk_backend", session = %session_id, error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }

  state.remove_session(&session_id).await;
  info!(target: "plonk_backend", session = %session_id, "WebSocket disconnected");
}

async fn send_ws(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

/// Advance the session and wrap the result as a Question or NoCandidates
/// message (or an error when the session vanished mid-flight).
async fn next_round(state: &AppState, session_id: &str) -> ServerWsMessage {
  let records = state.records.clone();
  let round = state
    .with_session(session_id, |session| {
      let mut rng = rand::thread_rng();
      let question = advance_question(session, &records, &mut rng);
      (question, session.filters.clone(), session.metrics)
    })
    .await;
  match round {
    Some((Some(question), _, metrics)) => ServerWsMessage::Question {
      question: to_out(&question),
      metrics,
    },
    Some((None, filters, metrics)) => ServerWsMessage::NoCandidates { filters, metrics },
    None => unknown_session(session_id),
  }
}

fn unknown_session(session_id: &str) -> ServerWsMessage {
  ServerWsMessage::Error {
    message: format!("Unknown sessionId: {}", session_id),
  }
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session_id: &str) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewQuestion => {
      let reply = next_round(state, session_id).await;
      tracing::info!(target: "quiz", session = %session_id, "WS new_question served");
      reply
    }

    ClientWsMessage::SubmitAnswer { country } => {
      let mode = state.cfg.match_mode;
      let reply = state
        .with_session(session_id, |session| {
          let reply = evaluate_answer(session, &country, mode);
          (reply, session.metrics)
        })
        .await;
      let Some((reply, metrics)) = reply else {
        return unknown_session(session_id);
      };
      match reply {
        AnswerReply::Evaluated(outcome) => {
          tracing::info!(target: "quiz", session = %session_id, correct = outcome.correct, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult {
            correct: outcome.correct,
            clicked: outcome.clicked,
            correct_country: outcome.correct_country,
            metrics,
            already_answered: false,
          }
        }
        AnswerReply::Replayed(outcome) => ServerWsMessage::AnswerResult {
          correct: outcome.correct,
          clicked: outcome.clicked,
          correct_country: outcome.correct_country,
          metrics,
          already_answered: true,
        },
        AnswerReply::NoActiveQuestion => ServerWsMessage::Error {
          message: "No active question for this session".into(),
        },
      }
    }

    ClientWsMessage::SetFilters {
      region,
      clue_type,
      clue_count,
    } => {
      let filters = QuizFilters {
        region,
        clue_type,
        clue_count: clue_count.or(Some(state.cfg.default_clue_count)),
      };
      apply_and_report(state, session_id, filters).await
    }

    ClientWsMessage::ClearFilters => {
      let filters = cleared_filters(&state.cfg);
      apply_and_report(state, session_id, filters).await
    }

    ClientWsMessage::ResetMetrics => {
      let metrics = state
        .with_session(session_id, |session| {
          session.metrics = Default::default();
          session.metrics
        })
        .await;
      match metrics {
        Some(metrics) => ServerWsMessage::Metrics { metrics },
        None => unknown_session(session_id),
      }
    }
  }
}

async fn apply_and_report(state: &AppState, session_id: &str, filters: QuizFilters) -> ServerWsMessage {
  let records = state.records.clone();
  let cfg = state.cfg.clone();
  let round = state
    .with_session(session_id, |session| {
      let mut rng = rand::thread_rng();
      let question = apply_filters(session, &records, filters, &cfg, &mut rng);
      (question, session.filters.clone(), session.metrics)
    })
    .await;
  match round {
    Some((Some(question), _, metrics)) => ServerWsMessage::Question {
      question: to_out(&question),
      metrics,
    },
    Some((None, filters, metrics)) => {
      tracing::info!(target: "quiz", session = %session_id, ?filters, "WS filters yield no candidates");
      ServerWsMessage::NoCandidates { filters, metrics }
    }
    None => unknown_session(session_id),
  }
}
