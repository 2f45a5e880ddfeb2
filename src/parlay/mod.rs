//! Multi-leg wager construction.
//!
//! Two builders:
//! - `accumulator`: random sampling with odds capping over scored selections
//! - `curated`: deterministic league-diverse pick over decoder-scored candidates

pub mod accumulator;
pub mod curated;
pub mod decoder;

pub use accumulator::{AccumulatorBuilder, AccumulatorConfig, BuildOutcome, ParlayCombination, ParlayLeg};
pub use curated::{CandidateOdds, CuratedBuilder, CuratedCandidate, CuratedConfig, CuratedParlay};
pub use decoder::{CandidateScorer, DecoderConfig, OddsAnalysis, OddsDecoder, OddsRule};
