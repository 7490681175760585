//! Plonk · Geography Quiz Backend
//!
//! Question engine for a click-the-country image quiz: a dataset of labeled
//! reference images grouped by country, a sampler that draws non-repeating
//! clue sets, an answer evaluator with name normalization across differing
//! geographic vocabularies, and an axum HTTP/WebSocket surface around it.

pub mod compiler;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod filter;
pub mod logic;
pub mod normalize;
pub mod protocol;
pub mod routes;
pub mod sampler;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod worldmap;
