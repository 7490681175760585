//! End-to-end engine tests: dataset in, question out, click evaluated —
//! exercising the same path the HTTP/WS handlers drive, without a server.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use plonk_backend::config::{MatchMode, QuizConfig};
use plonk_backend::dataset::parse_dataset;
use plonk_backend::domain::QuizFilters;
use plonk_backend::filter::candidates;
use plonk_backend::logic::{advance_question, evaluate_answer, names_match, AnswerReply};
use plonk_backend::state::{AppState, Session, SessionPhase};
use plonk_backend::worldmap::parse_world;

const FRANCE_ONLY: &str = r#"[
  {"country": "France", "region": "Europe", "items": [
    {"type": "bollard", "images": ["a.jpg"]},
    {"type": "pole", "images": ["b.jpg"]},
    {"type": "sign", "images": ["c.jpg"]}
  ]}
]"#;

#[test]
fn france_scenario_end_to_end() {
    let records = parse_dataset(FRANCE_ONLY, "inline").unwrap();

    // No filters, default clue count 3: exactly one candidate.
    let filters = QuizFilters::default();
    let pool = candidates(&records, &filters);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].country, "France");

    let mut session = Session::new("t".into(), filters);
    let mut rng = StdRng::seed_from_u64(99);
    let question = advance_question(&mut session, &records, &mut rng).expect("France qualifies");

    // All three images come back, each with a distinct type.
    assert_eq!(question.images.len(), 3);
    let types: HashSet<&str> = question.images.iter().map(|i| i.clue_type.as_str()).collect();
    assert_eq!(types.len(), 3);
    let urls: HashSet<&str> = question.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, HashSet::from(["a.jpg", "b.jpg", "c.jpg"]));
    assert_eq!(session.phase(), SessionPhase::Ready);

    // Click "France" on the map: correct, counters move.
    let reply = evaluate_answer(&mut session, "France", MatchMode::Normalized);
    let AnswerReply::Evaluated(outcome) = reply else {
        panic!("expected evaluation");
    };
    assert!(outcome.correct);
    assert_eq!(session.metrics.score, 1);
    assert_eq!(session.metrics.streak, 1);
    assert_eq!(session.metrics.answered, 1);
    assert_eq!(session.phase(), SessionPhase::Answered);
}

#[test]
fn datasets_below_the_clue_count_yield_no_candidates_without_panicking() {
    let raw = r#"[
      {"country": "France", "items": [
        {"type": "bollard", "images": ["a.jpg"]},
        {"type": "pole", "images": ["b.jpg"]}
      ]},
      {"country": "Japan", "items": [
        {"type": "pole", "images": ["c.jpg"]}
      ]}
    ]"#;
    let records = parse_dataset(raw, "inline").unwrap();
    assert!(candidates(&records, &QuizFilters::default()).is_empty());

    let mut session = Session::new("t".into(), QuizFilters::default());
    let mut rng = StdRng::seed_from_u64(1);
    assert!(advance_question(&mut session, &records, &mut rng).is_none());
    assert_eq!(session.phase(), SessionPhase::NoCandidates);

    // Answering in NoCandidates is guarded, not an error.
    let reply = evaluate_answer(&mut session, "France", MatchMode::Normalized);
    assert_eq!(reply, AnswerReply::NoActiveQuestion);
}

#[test]
fn map_vocabulary_bridges_to_dataset_vocabulary() {
    let world = r#"{
      "type": "FeatureCollection",
      "features": [
        {"properties": {"name": "United States of America"}, "geometry": null},
        {"properties": {"name": "Russian Federation"}, "geometry": null},
        {"properties": {"name": "Czech Republic"}, "geometry": null}
      ]
    }"#;
    let names = parse_world(world, "world.json").unwrap();

    for (clicked, dataset_country) in
        [(&names[0], "United States"), (&names[1], "Russia"), (&names[2], "Czechia")]
    {
        assert!(
            names_match(clicked, dataset_country, MatchMode::Normalized),
            "{clicked} should match {dataset_country}"
        );
        assert!(!names_match(clicked, dataset_country, MatchMode::Exact));
    }
}

#[tokio::test]
async fn session_store_round_trip_and_late_message_guard() {
    let records = parse_dataset(FRANCE_ONLY, "inline").unwrap();
    let state = AppState::from_parts(records, vec!["France".into()], QuizConfig::default());

    let id = state.create_session().await;
    assert_eq!(state.session_count().await, 1);

    // Drive one full round through the shared store.
    let records = state.records.clone();
    let phase = state
        .with_session(&id, |session| {
            let mut rng = StdRng::seed_from_u64(3);
            advance_question(session, &records, &mut rng).expect("question built");
            evaluate_answer(session, "france", MatchMode::Normalized);
            session.phase()
        })
        .await
        .expect("session exists");
    assert_eq!(phase, SessionPhase::Answered);

    // Teardown: late messages for a removed session touch nothing.
    state.remove_session(&id).await;
    assert_eq!(state.session_count().await, 0);
    let late = state.with_session(&id, |session| session.metrics).await;
    assert!(late.is_none());
}
