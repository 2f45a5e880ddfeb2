//! Best-price odds comparison.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Outcome, ProcessedMatch};

/// Side with the longer best price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSide {
    Home,
    Away,
}

impl ValueSide {
    pub fn outcome(&self) -> Outcome {
        match self {
            ValueSide::Home => Outcome::Home,
            ValueSide::Away => Outcome::Away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBet {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub best_home_odds: f64,
    pub best_away_odds: f64,
    /// First bookmaker quoting the best home price.
    pub home_bookmaker: Option<String>,
    pub away_bookmaker: Option<String>,
    /// `home` when the best home price beats the best away price.
    pub value_rating: ValueSide,
}

impl ValueBet {
    pub fn rated_odds(&self) -> f64 {
        match self.value_rating {
            ValueSide::Home => self.best_home_odds,
            ValueSide::Away => self.best_away_odds,
        }
    }
}

/// Always a list, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub value_bets: Vec<ValueBet>,
}

fn best_price(prices: &[f64]) -> Option<f64> {
    prices.iter().copied().reduce(f64::max)
}

pub fn compare_match(m: &ProcessedMatch) -> Option<ValueBet> {
    let best_home = best_price(m.home_odds())?;
    let best_away = best_price(m.away_odds())?;
    let first_at = |outcome, price| {
        m.bookmakers_at(outcome, price)
            .first()
            .map(|bm| bm.to_string())
    };

    Some(ValueBet {
        match_id: m.match_id().to_string(),
        home_team: m.home_team().to_string(),
        away_team: m.away_team().to_string(),
        league: m.league().map(str::to_string),
        best_home_odds: best_home,
        best_away_odds: best_away,
        home_bookmaker: first_at(Outcome::Home, best_home),
        away_bookmaker: first_at(Outcome::Away, best_away),
        value_rating: if best_home > best_away { ValueSide::Home } else { ValueSide::Away },
    })
}

pub fn compare(matches: &[ProcessedMatch]) -> ComparisonReport {
    let value_bets: Vec<ValueBet> = matches.iter().filter_map(compare_match).collect();
    info!(matches = matches.len(), value_bets = value_bets.len(), "Odds comparison complete");
    ComparisonReport { value_bets }
}
