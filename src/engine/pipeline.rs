//! Fetch → normalise → score for one league.

use anyhow::Result;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use super::dispatch::{run_algorithm, AlgorithmSettings};
use crate::algorithms::AlgorithmOutput;
use crate::odds::{normalize_payload, OddsSource};
use crate::types::{AlgorithmKind, ProcessedMatch};

/// Normalised matches for one league, or why there are none.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchBatch {
    /// The source returned no fixtures.
    NoData,
    /// Fixtures arrived but none survived validation.
    NoValidMatches { fetched: usize },
    Matches(Vec<ProcessedMatch>),
}

impl MatchBatch {
    pub fn matches(&self) -> &[ProcessedMatch] {
        match self {
            MatchBatch::Matches(m) => m,
            _ => &[],
        }
    }
}

/// A report serializes as the bare [`AlgorithmOutput`], so its own
/// `status`/`error` sentinel keys are the only ones present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutput {
    NoData,
    NoValidMatches { fetched: usize },
    #[serde(untagged)]
    Report(AlgorithmOutput),
}

pub struct Pipeline {
    settings: AlgorithmSettings,
}

impl Pipeline {
    pub fn new(settings: AlgorithmSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AlgorithmSettings {
        &self.settings
    }

    /// Fetch a league and normalise it. Source failures propagate.
    pub async fn fetch(&self, source: &dyn OddsSource, league_key: &str) -> Result<MatchBatch> {
        let raw = source.fetch_league(league_key).await?;
        if raw.is_empty() {
            warn!(league = league_key, "No fixtures returned");
            return Ok(MatchBatch::NoData);
        }

        let matches = normalize_payload(&raw);
        if matches.is_empty() {
            warn!(league = league_key, fetched = raw.len(), "No valid matches after normalisation");
            return Ok(MatchBatch::NoValidMatches { fetched: raw.len() });
        }

        info!(league = league_key, fetched = raw.len(), valid = matches.len(), "League loaded");
        Ok(MatchBatch::Matches(matches))
    }

    /// Score an already fetched batch.
    pub fn analyze<R: Rng + ?Sized>(&self, batch: &MatchBatch, kind: AlgorithmKind, rng: &mut R) -> Result<PipelineOutput> {
        let output = match batch {
            MatchBatch::NoData => PipelineOutput::NoData,
            MatchBatch::NoValidMatches { fetched } => PipelineOutput::NoValidMatches { fetched: *fetched },
            MatchBatch::Matches(matches) => PipelineOutput::Report(run_algorithm(kind, matches, &self.settings, rng)?),
        };
        Ok(output)
    }

    pub async fn run<R: Rng + ?Sized>(
        &self,
        source: &dyn OddsSource,
        league_key: &str,
        kind: AlgorithmKind,
        rng: &mut R,
    ) -> Result<PipelineOutput> {
        let batch = self.fetch(source, league_key).await?;
        self.analyze(&batch, kind, rng)
    }
}
