//! Cross-bookmaker arbitrage detection.
//!
//! Takes the best home/away/draw price across all bookmakers for a match.
//! If the summed implied probability of those prices is below 1, backing
//! every outcome proportionally locks in a profit.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stats::round_to;
use super::Sentinel;
use crate::types::{Outcome, ProcessedMatch};

/// Opportunities kept after ranking.
pub const MAX_OPPORTUNITIES: usize = 5;
/// Bookmakers listed per best price.
const MAX_BOOKMAKERS_PER_PRICE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub home_odds: f64,
    pub away_odds: f64,
    pub draw_odds: f64,
    pub home_bookmakers: Vec<String>,
    pub away_bookmakers: Vec<String>,
    pub draw_bookmakers: Vec<String>,
    /// 1/home + 1/away + 1/draw.
    pub implied_probability: f64,
    /// (1 − implied_probability) × 100.
    pub roi_pct: f64,
}

impl ArbitrageOpportunity {
    /// ROI rounded to one decimal place, as displayed.
    pub fn potential_return(&self) -> f64 {
        round_to(self.roi_pct, 1)
    }

    /// Best price for an outcome.
    pub fn odds(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home_odds,
            Outcome::Away => self.away_odds,
            Outcome::Draw => self.draw_odds,
        }
    }

    /// Stake split per outcome that returns the same payout whichever
    /// outcome wins, for a total outlay of `total_stake`.
    pub fn stake_split(&self, total_stake: f64) -> [(Outcome, f64); 3] {
        Outcome::ALL.map(|o| {
            let share = (1.0 / self.odds(o)) / self.implied_probability;
            (o, total_stake * share)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArbitrageReport {
    Opportunities {
        #[serde(rename = "arbitrage_opportunities")]
        opportunities: Vec<ArbitrageOpportunity>,
    },
    Exhausted {
        #[serde(rename = "status")]
        reason: Sentinel,
    },
}

/// Check one match for a sure bet.
pub fn detect_match(m: &ProcessedMatch) -> Option<ArbitrageOpportunity> {
    let (Some(home), Some(away), Some(draw)) = (
        m.best_quote(Outcome::Home),
        m.best_quote(Outcome::Away),
        m.best_quote(Outcome::Draw),
    ) else {
        debug!(match_id = %m.match_id(), "Missing best price, skipping");
        return None;
    };

    let implied = 1.0 / home + 1.0 / away + 1.0 / draw;
    if implied >= 1.0 {
        return None;
    }

    let bookmakers = |outcome: Outcome, price: f64| -> Vec<String> {
        m.bookmakers_at(outcome, price)
            .into_iter()
            .take(MAX_BOOKMAKERS_PER_PRICE)
            .map(str::to_string)
            .collect()
    };

    let opportunity = ArbitrageOpportunity {
        match_id: m.match_id().to_string(),
        home_team: m.home_team().to_string(),
        away_team: m.away_team().to_string(),
        league: m.league().map(str::to_string),
        home_odds: home,
        away_odds: away,
        draw_odds: draw,
        home_bookmakers: bookmakers(Outcome::Home, home),
        away_bookmakers: bookmakers(Outcome::Away, away),
        draw_bookmakers: bookmakers(Outcome::Draw, draw),
        implied_probability: implied,
        roi_pct: (1.0 - implied) * 100.0,
    };

    debug!(
        match_id = %opportunity.match_id,
        implied = format!("{:.4}", implied),
        roi = format!("{:.2}%", opportunity.roi_pct),
        "Arbitrage detected"
    );

    Some(opportunity)
}

/// Find the top opportunities by ROI across all matches.
pub fn detect(matches: &[ProcessedMatch]) -> ArbitrageReport {
    let mut opportunities: Vec<ArbitrageOpportunity> = matches.iter().filter_map(detect_match).collect();

    // Stable: equal ROIs keep input order.
    opportunities.sort_by(|a, b| b.roi_pct.total_cmp(&a.roi_pct));
    opportunities.truncate(MAX_OPPORTUNITIES);

    info!(
        matches = matches.len(),
        opportunities = opportunities.len(),
        "Arbitrage scan complete"
    );

    if opportunities.is_empty() {
        ArbitrageReport::Exhausted {
            reason: Sentinel::NoArbitrage,
        }
    } else {
        ArbitrageReport::Opportunities { opportunities }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
