//! Implied-probability threshold predictor.
//!
//! Takes the median implied probability of the home and away prices,
//! normalises the pair to sum to one and calls the side that clears the
//! threshold. The draw probability is computed but stays out of the
//! normalisation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::stats::median;
use super::Sentinel;
use crate::types::{Outcome, ProcessedMatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Normalised probability a side must exceed to be called.
    pub threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "Home Win")]
    HomeWin,
    #[serde(rename = "Away Win")]
    AwayWin,
    #[serde(rename = "No Clear Favorite")]
    NoClearFavorite,
}

impl Prediction {
    /// The side being backed, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Prediction::HomeWin => Some(Outcome::Home),
            Prediction::AwayWin => Some(Outcome::Away),
            Prediction::NoClearFavorite => None,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prediction::HomeWin => "Home Win",
            Prediction::AwayWin => "Away Win",
            Prediction::NoClearFavorite => "No Clear Favorite",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPrediction {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub prediction: Prediction,
    /// Normalised over home + away.
    pub home_prob: f64,
    pub away_prob: f64,
    /// Median implied probability of the draw, not normalised.
    pub draw_prob: f64,
    /// Median home price.
    pub home_odds: f64,
    /// Median away price.
    pub away_odds: f64,
}

impl ThresholdPrediction {
    /// Median price of the predicted side.
    pub fn predicted_odds(&self) -> Option<f64> {
        match self.prediction.outcome()? {
            Outcome::Home => Some(self.home_odds),
            Outcome::Away => Some(self.away_odds),
            Outcome::Draw => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionReport {
    Predictions { predictions: Vec<ThresholdPrediction> },
    Exhausted {
        #[serde(rename = "error")]
        reason: Sentinel,
    },
}

fn median_implied(prices: &[f64]) -> Option<f64> {
    let implied: Vec<f64> = prices.iter().filter(|p| **p > 0.0).map(|p| 1.0 / p).collect();
    median(&implied)
}

pub fn predict_match(m: &ProcessedMatch, threshold: f64) -> Option<ThresholdPrediction> {
    let home_raw = median_implied(m.home_odds())?;
    let away_raw = median_implied(m.away_odds())?;
    let draw_prob = median_implied(m.draw_odds())?;

    let total = home_raw + away_raw;
    if !(total.is_finite() && total > 0.0) {
        debug!(match_id = %m.match_id(), "Degenerate implied probabilities");
        return None;
    }
    let home_prob = home_raw / total;
    let away_prob = away_raw / total;

    let prediction = if home_prob > threshold {
        Prediction::HomeWin
    } else if away_prob > threshold {
        Prediction::AwayWin
    } else {
        Prediction::NoClearFavorite
    };

    Some(ThresholdPrediction {
        match_id: m.match_id().to_string(),
        home_team: m.home_team().to_string(),
        away_team: m.away_team().to_string(),
        league: m.league().map(str::to_string),
        prediction,
        home_prob,
        away_prob,
        draw_prob,
        home_odds: median(m.home_odds())?,
        away_odds: median(m.away_odds())?,
    })
}

pub fn predict(matches: &[ProcessedMatch], threshold: f64) -> PredictionReport {
    let predictions: Vec<ThresholdPrediction> =
        matches.iter().filter_map(|m| predict_match(m, threshold)).collect();

    info!(matches = matches.len(), predictions = predictions.len(), "Threshold predictions complete");

    if predictions.is_empty() {
        PredictionReport::Exhausted {
            reason: Sentinel::NoPredictions,
        }
    } else {
        PredictionReport::Predictions { predictions }
    }
}
