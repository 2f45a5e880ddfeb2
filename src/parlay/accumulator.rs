//! Randomised accumulator builder.
//!
//! Samples legs from a filtered pool, accepts them cheapest first while the
//! running product stays under the cap, and retries on a fixed attempt
//! budget until the combination clears the minimum total odds.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::types::{BetSageError, ScoredSelection, MATCH_WINNER_MARKET};

/// Prices at or below this are never accepted.
pub const MIN_INDIVIDUAL_ODDS: f64 = 1.01;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorConfig {
    pub min_legs: usize,
    pub max_legs: usize,
    pub min_total_odds: f64,
    pub max_total_odds: f64,
    pub max_individual_odds: f64,
    /// Build attempts before giving up.
    pub max_attempts: usize,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            min_legs: 1,
            max_legs: 12,
            min_total_odds: 10.0,
            max_total_odds: 20.0,
            max_individual_odds: 4.0,
            max_attempts: 1000,
        }
    }
}

impl AccumulatorConfig {
    fn validate(&self) -> Result<(), BetSageError> {
        if self.min_legs == 0 || self.min_legs > self.max_legs {
            return Err(BetSageError::invalid(
                "min_legs",
                format!("need 1 <= min_legs <= max_legs (got {}..{})", self.min_legs, self.max_legs),
            ));
        }
        if !(self.min_total_odds <= self.max_total_odds) {
            return Err(BetSageError::invalid(
                "min_total_odds",
                format!("inverted odds band {}..{}", self.min_total_odds, self.max_total_odds),
            ));
        }
        if !(self.max_individual_odds > MIN_INDIVIDUAL_ODDS) {
            return Err(BetSageError::invalid(
                "max_individual_odds",
                format!("must exceed {MIN_INDIVIDUAL_ODDS}"),
            ));
        }
        if self.max_attempts == 0 {
            return Err(BetSageError::invalid("max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// A selection together with the price it was accepted at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayLeg {
    #[serde(flatten)]
    pub selection: ScoredSelection,
    pub accepted_odds: f64,
}

impl ParlayLeg {
    pub fn new(selection: ScoredSelection) -> Self {
        let accepted_odds = selection.odds;
        Self {
            selection,
            accepted_odds,
        }
    }
}

/// Immutable multi-leg wager. `total_odds` is the product of the leg
/// prices in leg order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParlayCombination {
    #[serde(rename = "selections")]
    legs: Vec<ParlayLeg>,
    total_odds: f64,
}

impl ParlayCombination {
    pub fn new(legs: Vec<ParlayLeg>) -> Self {
        let total_odds = legs.iter().fold(1.0, |acc, leg| acc * leg.accepted_odds);
        Self { legs, total_odds }
    }

    pub fn legs(&self) -> &[ParlayLeg] {
        &self.legs
    }

    pub fn total_odds(&self) -> f64 {
        self.total_odds
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

impl fmt::Display for ParlayCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parlay with {} legs, odds: {:.2}", self.legs.len(), self.total_odds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    Built(ParlayCombination),
    /// Nothing survived filtering.
    NoSelections,
    /// The attempt budget ran out.
    NoValidParlay { attempts: usize },
}

impl BuildOutcome {
    pub fn combination(&self) -> Option<&ParlayCombination> {
        match self {
            BuildOutcome::Built(c) => Some(c),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AccumulatorBuilder {
    config: AccumulatorConfig,
}

impl AccumulatorBuilder {
    pub fn new(config: AccumulatorConfig) -> Result<Self, BetSageError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Keep match-winner selections in `(1.01, max_individual_odds]`, one
    /// per fixture at its lowest price. First-seen order is preserved.
    pub fn filter(&self, selections: &[ScoredSelection]) -> Vec<ScoredSelection> {
        let mut pool: Vec<ScoredSelection> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for s in selections {
            if s.market != MATCH_WINNER_MARKET {
                continue;
            }
            if !(s.odds > MIN_INDIVIDUAL_ODDS && s.odds <= self.config.max_individual_odds) {
                continue;
            }
            let key = (s.home_team.clone(), s.away_team.clone());
            match index.get(&key) {
                Some(&i) => {
                    if s.odds < pool[i].odds {
                        pool[i] = s.clone();
                    }
                }
                None => {
                    index.insert(key, pool.len());
                    pool.push(s.clone());
                }
            }
        }

        info!(raw = selections.len(), filtered = pool.len(), "Filtered accumulator selections");
        pool
    }

    /// One sampling pass. `None` when the result misses the leg or odds floor.
    fn attempt<R: Rng + ?Sized>(&self, pool: &[ScoredSelection], rng: &mut R) -> Option<ParlayCombination> {
        let cfg = &self.config;
        let upper = cfg.max_legs.min(pool.len());
        let size = rng.gen_range(cfg.min_legs..=upper);

        let mut picks: Vec<&ScoredSelection> = pool.choose_multiple(rng, size).collect();
        picks.sort_by(|a, b| a.odds.total_cmp(&b.odds));

        let mut legs = Vec::with_capacity(picks.len());
        let mut cumulative = 1.0;
        for pick in picks {
            let next = cumulative * pick.odds;
            if next <= cfg.max_total_odds {
                legs.push(ParlayLeg::new(pick.clone()));
                cumulative = next;
            }
        }

        if legs.len() < cfg.min_legs || cumulative < cfg.min_total_odds {
            return None;
        }
        Some(ParlayCombination::new(legs))
    }

    /// Build from an already filtered pool.
    pub fn build<R: Rng + ?Sized>(&self, pool: &[ScoredSelection], rng: &mut R) -> BuildOutcome {
        if pool.is_empty() {
            return BuildOutcome::NoSelections;
        }
        if pool.len() < self.config.min_legs {
            warn!(pool = pool.len(), min_legs = self.config.min_legs, "Pool smaller than minimum legs");
            return BuildOutcome::NoValidParlay { attempts: 0 };
        }

        for attempt in 1..=self.config.max_attempts {
            if let Some(combination) = self.attempt(pool, rng) {
                debug!(attempt, legs = combination.len(), "Accumulator attempt accepted");
                info!(
                    legs = combination.len(),
                    total_odds = format!("{:.2}", combination.total_odds()),
                    attempts = attempt,
                    "Accumulator built"
                );
                return BuildOutcome::Built(combination);
            }
        }

        warn!(attempts = self.config.max_attempts, pool = pool.len(), "No valid accumulator found");
        BuildOutcome::NoValidParlay {
            attempts: self.config.max_attempts,
        }
    }

    /// Filter raw selections, then build.
    pub fn generate<R: Rng + ?Sized>(&self, selections: &[ScoredSelection], rng: &mut R) -> BuildOutcome {
        let pool = self.filter(selections);
        if pool.is_empty() {
            warn!("No valid selections after filtering");
            return BuildOutcome::NoSelections;
        }
        self.build(&pool, rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
