//! End-to-end tests: raw payload through normalisation, scoring,
//! selection conversion and parlay construction.

mod fixtures;
mod parlay;
mod pipeline;
