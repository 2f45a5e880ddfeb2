//! BetSage: head-to-head odds analysis and parlay construction
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod algorithms;
pub mod selections;
pub mod parlay;
pub mod engine;
pub mod format;
