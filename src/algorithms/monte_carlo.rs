//! Monte Carlo outcome simulation.
//!
//! Draws Bernoulli trials at the implied probability of each market's
//! median price and rates the market by simulated return per unit staked.
//! The generator is always supplied by the caller.

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stats::median;
use super::Sentinel;
use crate::types::{BetSageError, Outcome, ProcessedMatch};

/// Markets whose median price is below this are not simulated.
pub const MIN_MEDIAN_ODDS: f64 = 1.1;
pub const GOOD_VALUE_SCORE: f64 = 1.05;
pub const FAIR_VALUE_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Trials per market.
    pub simulations: usize,
    /// Fixed seed for reproducible runs; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueRating {
    Good,
    Fair,
    Poor,
}

impl ValueRating {
    pub fn from_score(value_score: f64) -> Self {
        if value_score > GOOD_VALUE_SCORE {
            ValueRating::Good
        } else if value_score > FAIR_VALUE_SCORE {
            ValueRating::Fair
        } else {
            ValueRating::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub market: Outcome,
    pub team: String,
    /// Empirical win rate over all trials.
    pub win_probability: f64,
    /// Median price the market was simulated at.
    pub odds: f64,
    pub value_score: f64,
    pub edge: f64,
    pub value_rating: ValueRating,
    pub recommended_stake_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationReport {
    Results {
        #[serde(rename = "simulation_results")]
        results: Vec<SimulationResult>,
    },
    Exhausted {
        #[serde(rename = "error")]
        reason: Sentinel,
    },
}

struct MarketRun {
    outcome: Outcome,
    median_odds: f64,
    win_rate: f64,
    value_score: f64,
    edge: f64,
}

#[derive(Debug)]
pub struct Simulator {
    config: MonteCarloConfig,
}

impl Simulator {
    /// Fails when `simulations` is zero.
    pub fn new(config: MonteCarloConfig) -> Result<Self, BetSageError> {
        if config.simulations == 0 {
            return Err(BetSageError::invalid("simulations", "must be at least 1"));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    fn run_market<R: Rng + ?Sized>(&self, outcome: Outcome, prices: &[f64], rng: &mut R) -> Option<MarketRun> {
        let median_odds = median(prices)?;
        if median_odds < MIN_MEDIAN_ODDS {
            return None;
        }
        let trial = Bernoulli::new(1.0 / median_odds).ok()?;

        let mut wins = 0usize;
        for _ in 0..self.config.simulations {
            if trial.sample(rng) {
                wins += 1;
            }
        }
        let win_rate = wins as f64 / self.config.simulations as f64;
        let value_score = win_rate * median_odds;

        Some(MarketRun {
            outcome,
            median_odds,
            win_rate,
            value_score,
            edge: value_score - 1.0,
        })
    }

    /// Simulate every market of one match and return its best one, unless
    /// that market rates poor.
    pub fn simulate_match<R: Rng + ?Sized>(&self, m: &ProcessedMatch, rng: &mut R) -> Option<SimulationResult> {
        let mut best: Option<MarketRun> = None;
        let mut best_edge = -1.0;
        for outcome in Outcome::ALL {
            let Some(run) = self.run_market(outcome, m.odds(outcome), rng) else {
                continue;
            };
            if run.edge > best_edge {
                best_edge = run.edge;
                best = Some(run);
            }
        }

        let best = best?;
        let value_rating = ValueRating::from_score(best.value_score);
        if value_rating == ValueRating::Poor {
            debug!(match_id = %m.match_id(), score = best.value_score, "Best market rated poor");
            return None;
        }

        let recommended_stake_pct = if best.edge > 0.0 {
            best.edge / (best.median_odds - 1.0) * 100.0
        } else {
            0.0
        };

        Some(SimulationResult {
            match_id: m.match_id().to_string(),
            home_team: m.home_team().to_string(),
            away_team: m.away_team().to_string(),
            league: m.league().map(str::to_string),
            market: best.outcome,
            team: m.team_for(best.outcome).to_string(),
            win_probability: best.win_rate,
            odds: best.median_odds,
            value_score: best.value_score,
            edge: best.edge,
            value_rating,
            recommended_stake_pct,
        })
    }

    pub fn simulate<R: Rng + ?Sized>(&self, matches: &[ProcessedMatch], rng: &mut R) -> SimulationReport {
        let results: Vec<SimulationResult> = matches
            .iter()
            .filter_map(|m| self.simulate_match(m, rng))
            .collect();

        info!(
            matches = matches.len(),
            valuable = results.len(),
            simulations = self.config.simulations,
            "Monte Carlo simulation complete"
        );

        if results.is_empty() {
            SimulationReport::Exhausted {
                reason: Sentinel::NoValuableMarkets,
            }
        } else {
            SimulationReport::Results { results }
        }
    }
}

/// One-shot simulation with an explicit trial count.
pub fn simulate<R: Rng + ?Sized>(
    matches: &[ProcessedMatch],
    simulations: usize,
    rng: &mut R,
) -> Result<SimulationReport, BetSageError> {
    let sim = Simulator::new(MonteCarloConfig {
        simulations,
        seed: None,
    })?;
    Ok(sim.simulate(matches, rng))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
