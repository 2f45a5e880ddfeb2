//! Trend analysis ("arima").
//!
//! Smooths each market's price sequence with a 3-point moving average and
//! recommends the market with the strongest trend, tie-broken by lowest
//! volatility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::stats::{mean, moving_average, population_std};
use super::Sentinel;
use crate::types::{Outcome, ProcessedMatch};

/// Moving-average window (capped at the observation count).
pub const TREND_WINDOW: usize = 3;
/// Markets with fewer observations are not analysed.
pub const MIN_OBSERVATIONS: usize = 3;
/// Observations averaged for the current price.
const CURRENT_PRICE_POINTS: usize = 3;
/// A rising market above this volatility is a strong buy.
pub const STRONG_BUY_VOLATILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Hold,
}

/// Trend statistics for one market of one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTrend {
    pub outcome: Outcome,
    /// Mean of the last three observations.
    pub current_odds: f64,
    /// Population standard deviation of all observations.
    pub volatility: f64,
    pub trend: Trend,
    /// |last − first| moving-average point.
    pub trend_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub recommended_market: Outcome,
    pub recommended_team: String,
    pub current_odds: f64,
    pub trend: Trend,
    pub trend_strength: f64,
    pub volatility: f64,
    pub recommendation: Recommendation,
}

/// Match-keyed trends, or the `no_clear_trends` sentinel. An empty map is
/// never produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrendReport {
    Trends {
        #[serde(rename = "arima")]
        trends: BTreeMap<String, TrendResult>,
    },
    Exhausted {
        #[serde(rename = "error")]
        reason: Sentinel,
    },
}

/// Compute trend statistics for one price sequence.
pub fn analyze_market(outcome: Outcome, prices: &[f64]) -> Option<MarketTrend> {
    if prices.len() < MIN_OBSERVATIONS {
        return None;
    }
    let ma = moving_average(prices, TREND_WINDOW);
    let (first, last) = (*ma.first()?, *ma.last()?);
    let tail = &prices[prices.len().saturating_sub(CURRENT_PRICE_POINTS)..];

    Some(MarketTrend {
        outcome,
        current_odds: mean(tail)?,
        volatility: population_std(prices)?,
        trend: if last > first { Trend::Rising } else { Trend::Falling },
        trend_strength: (last - first).abs(),
    })
}

/// Pick the strongest market of a match, or `None` if no market has enough
/// observations.
pub fn analyze_match(m: &ProcessedMatch) -> Option<TrendResult> {
    let mut best: Option<MarketTrend> = None;
    for outcome in Outcome::ALL {
        let Some(candidate) = analyze_market(outcome, m.odds(outcome)) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(b) => {
                candidate.trend_strength > b.trend_strength
                    || (candidate.trend_strength == b.trend_strength
                        && candidate.volatility < b.volatility)
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    let best = best?;
    let recommendation = if best.trend == Trend::Rising && best.volatility > STRONG_BUY_VOLATILITY {
        Recommendation::StrongBuy
    } else {
        Recommendation::Hold
    };

    Some(TrendResult {
        home_team: m.home_team().to_string(),
        away_team: m.away_team().to_string(),
        league: m.league().map(str::to_string),
        recommended_market: best.outcome,
        recommended_team: m.team_for(best.outcome).to_string(),
        current_odds: best.current_odds,
        trend: best.trend,
        trend_strength: best.trend_strength,
        volatility: best.volatility,
        recommendation,
    })
}

/// Analyse every match.
pub fn analyze(matches: &[ProcessedMatch]) -> TrendReport {
    let mut trends = BTreeMap::new();
    for m in matches {
        match analyze_match(m) {
            Some(result) => {
                trends.insert(m.match_id().to_string(), result);
            }
            None => debug!(match_id = %m.match_id(), "No market with enough observations"),
        }
    }

    info!(matches = matches.len(), trends = trends.len(), "Trend analysis complete");

    if trends.is_empty() {
        TrendReport::Exhausted {
            reason: Sentinel::NoClearTrends,
        }
    } else {
        TrendReport::Trends { trends }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
