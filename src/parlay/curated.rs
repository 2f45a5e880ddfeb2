//! Curated, league-diverse parlay builder.
//!
//! Walks confidence-qualified candidates in profit-score order and accepts
//! home legs, one per league, while the running product stays inside the
//! target odds band. Deterministic: no randomness involved.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use super::decoder::OddsAnalysis;
use crate::types::BetSageError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratedConfig {
    pub min_legs: usize,
    pub max_legs: usize,
    /// Lower bound of the target total-odds band.
    pub target_low: f64,
    /// Upper bound of the target total-odds band.
    pub target_high: f64,
    pub min_confidence: f64,
}

impl Default for CuratedConfig {
    fn default() -> Self {
        Self {
            min_legs: 2,
            max_legs: 5,
            target_low: 5.0,
            target_high: 10.0,
            min_confidence: 0.7,
        }
    }
}

impl CuratedConfig {
    fn validate(&self) -> Result<(), BetSageError> {
        if self.max_legs == 0 || self.min_legs > self.max_legs {
            return Err(BetSageError::invalid(
                "min_legs",
                format!("need min_legs <= max_legs and max_legs >= 1 (got {}..{})", self.min_legs, self.max_legs),
            ));
        }
        if !(self.target_low > 0.0 && self.target_low <= self.target_high) {
            return Err(BetSageError::invalid(
                "target_low",
                format!("inverted odds band {}..{}", self.target_low, self.target_high),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateOdds {
    pub home: f64,
    pub away: f64,
    pub draw: f64,
    #[serde(rename = "over_2.5")]
    pub over_2_5: Option<f64>,
}

/// A match pre-scored for curated selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedCandidate {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub commence_time: String,
    pub bookmaker: String,
    pub odds: CandidateOdds,
    pub analysis: OddsAnalysis,
    pub profit_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedParlay {
    pub legs: Vec<CuratedCandidate>,
    /// Product of leg home prices; 0 for an empty parlay.
    pub total_odds: f64,
    /// Mean leg confidence; 0 for an empty parlay.
    pub confidence: f64,
    /// Set when the odds band could not be reached and the top candidates
    /// were returned instead.
    pub fallback: bool,
}

impl CuratedParlay {
    fn from_legs(legs: Vec<CuratedCandidate>, fallback: bool) -> Self {
        if legs.is_empty() {
            return Self::empty();
        }
        let total_odds = legs.iter().fold(1.0, |acc, l| acc * l.odds.home);
        let confidence = legs.iter().map(|l| l.analysis.confidence).sum::<f64>() / legs.len() as f64;
        Self {
            legs,
            total_odds,
            confidence,
            fallback,
        }
    }

    pub fn empty() -> Self {
        Self {
            legs: Vec::new(),
            total_odds: 0.0,
            confidence: 0.0,
            fallback: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CuratedBuilder {
    config: CuratedConfig,
}

impl CuratedBuilder {
    pub fn new(config: CuratedConfig) -> Result<Self, BetSageError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CuratedConfig {
        &self.config
    }

    pub fn build(&self, candidates: &[CuratedCandidate]) -> CuratedParlay {
        let cfg = &self.config;

        let mut qualified: Vec<&CuratedCandidate> = candidates
            .iter()
            .filter(|c| c.analysis.confidence >= cfg.min_confidence && c.odds.home > 1.0)
            .collect();
        if qualified.is_empty() {
            warn!(candidates = candidates.len(), "No candidate meets the confidence floor");
            return CuratedParlay::empty();
        }
        qualified.sort_by(|a, b| b.profit_score.total_cmp(&a.profit_score));

        let mut leagues: HashSet<&str> = HashSet::new();
        let mut selected: Vec<&CuratedCandidate> = Vec::new();
        let mut total_odds = 1.0;

        for candidate in &qualified {
            if selected.len() >= cfg.max_legs || total_odds > cfg.target_high {
                break;
            }
            if !leagues.contains(candidate.league.as_str()) {
                let next = total_odds * candidate.odds.home;
                if next <= cfg.target_high {
                    leagues.insert(candidate.league.as_str());
                    selected.push(candidate);
                    total_odds = next;
                }
            }
            if total_odds >= cfg.target_low && selected.len() >= cfg.min_legs {
                break;
            }
        }

        if total_odds >= cfg.target_low {
            info!(
                legs = selected.len(),
                total_odds = format!("{:.2}", total_odds),
                "Curated parlay built"
            );
            CuratedParlay::from_legs(selected.into_iter().cloned().collect(), false)
        } else {
            warn!(
                reached = format!("{:.2}", total_odds),
                target = cfg.target_low,
                "Odds band not reached, falling back to top candidates"
            );
            let top = qualified.into_iter().take(cfg.max_legs).cloned().collect();
            CuratedParlay::from_legs(top, true)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
