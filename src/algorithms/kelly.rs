//! Kelly criterion stake sizing.
//!
//! Sizes home-win stakes with fractional Kelly, a per-bet bankroll cap and
//! a sensitivity check that discounts the model probability before
//! accepting an edge.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Sentinel;
use crate::types::{BetSageError, Outcome, ProcessedMatch};

/// Recommendations kept after ranking.
pub const MAX_RECOMMENDATIONS: usize = 5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KellyConfig {
    /// Bankroll in currency units.
    pub bankroll: f64,
    /// Fractional Kelly multiplier (0.5 = half-Kelly). Lower = more conservative.
    pub fractional_kelly: f64,
    /// Maximum stake as a fraction of bankroll.
    pub max_stake_percent: f64,
    /// Minimum base edge (p × odds − 1) to consider.
    pub edge_threshold: f64,
    /// Probability multiplier for the robustness check. Any positive
    /// value; above 1.0 the check inflates the probability instead.
    pub sensitivity_adjustment: f64,
    /// Minimum stake in currency units (below this, don't bother).
    pub min_stake: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            bankroll: 1000.0,
            fractional_kelly: 0.5,     // Half-Kelly
            max_stake_percent: 0.05,   // Max 5% of bankroll per bet
            edge_threshold: 0.05,
            sensitivity_adjustment: 0.9,
            min_stake: 1.0,
        }
    }
}

impl KellyConfig {
    fn validate(&self) -> Result<(), BetSageError> {
        if !(self.bankroll.is_finite() && self.bankroll > 0.0) {
            return Err(BetSageError::invalid("bankroll", format!("must be positive, got {}", self.bankroll)));
        }
        if !(self.fractional_kelly > 0.0 && self.fractional_kelly <= 1.0) {
            return Err(BetSageError::invalid(
                "fractional_kelly",
                format!("must be in (0, 1], got {}", self.fractional_kelly),
            ));
        }
        if !(self.max_stake_percent > 0.0 && self.max_stake_percent <= 1.0) {
            return Err(BetSageError::invalid(
                "max_stake_percent",
                format!("must be in (0, 1], got {}", self.max_stake_percent),
            ));
        }
        if !(self.sensitivity_adjustment.is_finite() && self.sensitivity_adjustment > 0.0) {
            return Err(BetSageError::invalid(
                "sensitivity_adjustment",
                format!("must be positive, got {}", self.sensitivity_adjustment),
            ));
        }
        if !self.edge_threshold.is_finite() {
            return Err(BetSageError::invalid("edge_threshold", "must be finite"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Kelly calculator
// ---------------------------------------------------------------------------

/// Sized stake recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecommendation {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub bookmaker: String,
    pub odds: f64,
    pub probability: f64,
    /// Currency amount after multiplier and caps.
    pub recommended_stake: f64,
    /// p × odds − 1.
    pub base_edge: f64,
    /// p × sensitivity × odds − 1.
    pub conservative_edge: f64,
    /// Stake as a percentage of bankroll.
    pub bankroll_usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StakeReport {
    Recommendations {
        #[serde(rename = "recommended_parlays")]
        recommendations: Vec<StakeRecommendation>,
    },
    Exhausted {
        #[serde(rename = "status")]
        reason: Sentinel,
    },
}

#[derive(Debug)]
pub struct KellyCalculator {
    config: KellyConfig,
}

impl KellyCalculator {
    /// Fails on a non-positive bankroll or out-of-range fractions.
    pub fn new(config: KellyConfig) -> Result<Self, BetSageError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Access the Kelly configuration.
    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Size a home-win stake for one match.
    ///
    /// full_kelly = (edge / (odds − 1)) × bankroll, then scaled by the
    /// fractional multiplier and capped at `max_stake_percent × bankroll`.
    pub fn size_stake(&self, m: &ProcessedMatch) -> Option<StakeRecommendation> {
        let cfg = &self.config;

        let Some(probability) = m.home_probability() else {
            debug!(match_id = %m.match_id(), "No model probability, skipping");
            return None;
        };
        if !(probability > 0.0 && probability < 1.0) {
            debug!(match_id = %m.match_id(), probability, "Probability out of range");
            return None;
        }

        // First bookmaker wins ties.
        let (bookmaker, odds) = m
            .bookmakers()
            .iter()
            .filter_map(|bm| bm.price(Outcome::Home).map(|p| (bm.key.as_str(), p)))
            .fold(None::<(&str, f64)>, |best, (k, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((k, p)),
            })?;
        if odds <= 1.0 {
            return None;
        }

        let base_edge = probability * odds - 1.0;
        if base_edge < cfg.edge_threshold {
            debug!(
                match_id = %m.match_id(),
                edge = format!("{:.2}%", base_edge * 100.0),
                "Edge below threshold"
            );
            return None;
        }

        let conservative_edge = probability * cfg.sensitivity_adjustment * odds - 1.0;
        if conservative_edge <= 0.0 {
            debug!(
                match_id = %m.match_id(),
                conservative = format!("{:.2}%", conservative_edge * 100.0),
                "Edge not robust to sensitivity check"
            );
            return None;
        }

        let full_kelly = (base_edge / (odds - 1.0)) * cfg.bankroll;
        let stake = (full_kelly * cfg.fractional_kelly)
            .min(cfg.max_stake_percent * cfg.bankroll)
            .min(cfg.bankroll)
            .max(0.0);

        if stake < cfg.min_stake {
            debug!(match_id = %m.match_id(), stake, min = cfg.min_stake, "Stake below minimum");
            return None;
        }

        debug!(
            match_id = %m.match_id(),
            bookmaker,
            odds,
            stake = format!("{:.2}", stake),
            edge = format!("{:.2}%", base_edge * 100.0),
            "Stake sized"
        );

        Some(StakeRecommendation {
            match_id: m.match_id().to_string(),
            home_team: m.home_team().to_string(),
            away_team: m.away_team().to_string(),
            league: m.league().map(str::to_string),
            bookmaker: bookmaker.to_string(),
            odds,
            probability,
            recommended_stake: stake,
            base_edge,
            conservative_edge,
            bankroll_usage: stake / cfg.bankroll * 100.0,
        })
    }

    /// Size every match and keep the top recommendations by base edge.
    pub fn size_stakes(&self, matches: &[ProcessedMatch]) -> StakeReport {
        let mut recommendations: Vec<StakeRecommendation> =
            matches.iter().filter_map(|m| self.size_stake(m)).collect();

        recommendations.sort_by(|a, b| b.base_edge.total_cmp(&a.base_edge));
        recommendations.truncate(MAX_RECOMMENDATIONS);

        info!(
            matches = matches.len(),
            recommended = recommendations.len(),
            "Kelly sizing complete"
        );

        if recommendations.is_empty() {
            StakeReport::Exhausted {
                reason: Sentinel::NoValuableParlays,
            }
        } else {
            StakeReport::Recommendations { recommendations }
        }
    }
}

/// One-shot sizing with explicit parameters.
pub fn size_stakes(
    matches: &[ProcessedMatch],
    bankroll: f64,
    fractional_kelly: f64,
    max_stake_percent: f64,
    edge_threshold: f64,
    sensitivity_adjustment: f64,
) -> Result<StakeReport, BetSageError> {
    let calc = KellyCalculator::new(KellyConfig {
        bankroll,
        fractional_kelly,
        max_stake_percent,
        edge_threshold,
        sensitivity_adjustment,
        ..KellyConfig::default()
    })?;
    Ok(calc.size_stakes(matches))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
