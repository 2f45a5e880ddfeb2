//! Odds ingestion.
//!
//! Defines the `OddsSource` trait for anything that can supply raw
//! head-to-head payloads, plus implementations for:
//! - The Odds API v4 (HTTP)
//! - JSON fixture files (offline analysis and tests)
//!
//! Payloads flow into [`normalizer`] which produces `ProcessedMatch`es.

pub mod normalizer;
pub mod the_odds_api;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

pub use normalizer::{normalize, normalize_match, normalize_payload};

/// Abstraction over raw odds providers.
///
/// Implementors return the provider's match objects untouched; all
/// validation happens in the normaliser.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Fetch every upcoming fixture for a league (API sport key).
    async fn fetch_league(&self, league_key: &str) -> Result<Vec<Value>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Reads a JSON array of raw matches from disk. The league key is ignored.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl OddsSource for JsonFileSource {
    async fn fetch_league(&self, league_key: &str) -> Result<Vec<Value>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read odds file: {}", self.path.display()))?;
        let matches: Vec<Value> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse odds file: {}", self.path.display()))?;
        info!(
            path = %self.path.display(),
            league = league_key,
            count = matches.len(),
            "Loaded matches from file"
        );
        Ok(matches)
    }

    fn name(&self) -> &str {
        "file"
    }
}
