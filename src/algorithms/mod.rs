//! The six match scorers.
//!
//! Each scorer consumes a slice of validated matches and returns a typed
//! report whose serde form carries one well-known top-level key, or a
//! single-key sentinel when nothing qualified.

pub mod arbitrage;
pub mod comparison;
pub mod kelly;
pub mod monte_carlo;
pub mod stats;
pub mod threshold;
pub mod trend;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use arbitrage::{ArbitrageOpportunity, ArbitrageReport};
pub use comparison::{ComparisonReport, ValueBet, ValueSide};
pub use kelly::{KellyCalculator, KellyConfig, StakeRecommendation, StakeReport};
pub use monte_carlo::{MonteCarloConfig, SimulationReport, SimulationResult};
pub use threshold::{Prediction, PredictionReport, ThresholdConfig, ThresholdPrediction};
pub use trend::{TrendReport, TrendResult};

/// Exhaustion marker: the scorer ran but nothing qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    NoClearTrends,
    NoArbitrage,
    NoValuableParlays,
    NoValuableMarkets,
    NoPredictions,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::NoClearTrends => "no_clear_trends",
            Sentinel::NoArbitrage => "no_arbitrage",
            Sentinel::NoValuableParlays => "no_valuable_parlays",
            Sentinel::NoValuableMarkets => "no_valuable_markets",
            Sentinel::NoPredictions => "no_predictions",
        }
    }

    /// Human-readable message for display.
    pub fn message(&self) -> &'static str {
        match self {
            Sentinel::NoClearTrends => "No clear trends found",
            Sentinel::NoArbitrage => "No arbitrage opportunities found",
            Sentinel::NoValuableParlays => "No valuable stakes found",
            Sentinel::NoValuableMarkets => "No valuable markets found",
            Sentinel::NoPredictions => "No predictions could be made",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of any one scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlgorithmOutput {
    Trend(TrendReport),
    Arbitrage(ArbitrageReport),
    Kelly(StakeReport),
    MonteCarlo(SimulationReport),
    Threshold(PredictionReport),
    Comparison(ComparisonReport),
}

impl AlgorithmOutput {
    /// The sentinel, if the scorer came up empty.
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            AlgorithmOutput::Trend(TrendReport::Exhausted { reason })
            | AlgorithmOutput::Arbitrage(ArbitrageReport::Exhausted { reason })
            | AlgorithmOutput::Kelly(StakeReport::Exhausted { reason })
            | AlgorithmOutput::MonteCarlo(SimulationReport::Exhausted { reason })
            | AlgorithmOutput::Threshold(PredictionReport::Exhausted { reason }) => Some(*reason),
            _ => None,
        }
    }

    /// True when the report holds no results (sentinel or empty list).
    pub fn is_empty(&self) -> bool {
        match self {
            AlgorithmOutput::Comparison(report) => report.value_bets.is_empty(),
            other => other.sentinel().is_some(),
        }
    }
}
