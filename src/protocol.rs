//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! The question DTO deliberately omits the expected answer: the client only
//! learns `correctCountry` from an answer result.

use serde::{Deserialize, Serialize};

use crate::domain::{Question, QuestionImage, QuizFilters, SessionMetrics};
use crate::state::SessionPhase;

/// Messages the client can send over WebSocket. A WS connection owns its
/// session, so no message needs a session id.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Request the next question (also used from the Answered phase).
    NewQuestion,
    /// The user clicked a map region.
    SubmitAnswer {
        country: String,
    },
    SetFilters {
        #[serde(default)]
        region: Option<String>,
        #[serde(default, rename = "clueType")]
        clue_type: Option<String>,
        #[serde(default, rename = "clueCount")]
        clue_count: Option<usize>,
    },
    ClearFilters,
    ResetMetrics,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionStarted {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Question {
        question: QuestionOut,
        metrics: SessionMetrics,
    },
    /// The filters yield no qualifying record; broaden or clear them.
    NoCandidates {
        filters: QuizFilters,
        metrics: SessionMetrics,
    },
    AnswerResult {
        correct: bool,
        clicked: String,
        #[serde(rename = "correctCountry")]
        correct_country: String,
        metrics: SessionMetrics,
        /// True when this replays an earlier answer (the click was ignored).
        #[serde(rename = "alreadyAnswered")]
        already_answered: bool,
    },
    Metrics {
        metrics: SessionMetrics,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for question delivery.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub images: Vec<QuestionImage>,
}

/// Convert the internal `Question` to the public DTO (answer withheld).
pub fn to_out(q: &Question) -> QuestionOut {
    QuestionOut {
        images: q.images.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct SessionCreatedOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub country: String,
}

#[derive(Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub clicked: String,
    #[serde(rename = "correctCountry")]
    pub correct_country: String,
    pub metrics: SessionMetrics,
    #[serde(rename = "alreadyAnswered")]
    pub already_answered: bool,
}

#[derive(Deserialize)]
pub struct FiltersIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, rename = "clueType")]
    pub clue_type: Option<String>,
    #[serde(default, rename = "clueCount")]
    pub clue_count: Option<usize>,
}

/// One full view of a session round: phase, the question when one is active,
/// and the current counters. Served by the question/filters endpoints.
#[derive(Serialize)]
pub struct RoundOut {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionOut>,
    pub filters: QuizFilters,
    pub metrics: SessionMetrics,
}

#[derive(Serialize)]
pub struct MetricsOut {
    pub metrics: SessionMetrics,
}
