//! Odds-range rule decoder and curated candidate scoring.
//!
//! Maps a price to a named prediction and a base confidence using a fixed
//! table of inclusive price bands, then blends confidence and price into
//! the profit score the curated builder ranks by.

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::curated::{CandidateOdds, CuratedCandidate};
use crate::algorithms::stats::round_to;
use crate::types::{BookmakerQuote, Outcome, ProcessedMatch};

/// Prediction label when no rule covers the price.
pub const NO_RULE_MATCH: &str = "no_rule_match";
const CONFIDENCE_WEIGHT: f64 = 0.65;
const PRICE_WEIGHT: f64 = 0.35;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One price band. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRule {
    pub low: f64,
    pub high: f64,
    pub prediction: String,
    pub confidence: f64,
}

impl OddsRule {
    fn new(low: f64, high: f64, prediction: &str, confidence: f64) -> Self {
        Self {
            low,
            high,
            prediction: prediction.to_string(),
            confidence,
        }
    }

    pub fn covers(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Checked in order; first match wins.
    pub rules: Vec<OddsRule>,
    /// Confidence multiplier applied early in the season.
    pub season_boost: f64,
    /// Commence months (1-12) that count as early season.
    pub early_season_months: Vec<u32>,
    /// Bookmaker whose quote is scored when available.
    pub preferred_bookmaker: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                OddsRule::new(1.10, 1.19, "under_1.5_ht", 0.95),
                OddsRule::new(1.20, 1.29, "straight_win", 0.90),
                OddsRule::new(1.30, 1.44, "low_scoring_league_win", 0.85),
                OddsRule::new(1.50, 1.61, "risky_win", 0.75),
                OddsRule::new(3.00, 3.39, "ft_draw_xht", 0.80),
                OddsRule::new(3.40, 3.60, "high_scoring_draw", 0.70),
            ],
            season_boost: 1.2,
            early_season_months: vec![8, 9, 10],
            preferred_bookmaker: "bet365".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsAnalysis {
    pub prediction: String,
    pub confidence: f64,
    pub original_odds: f64,
}

impl OddsAnalysis {
    fn no_match() -> Self {
        Self {
            prediction: NO_RULE_MATCH.to_string(),
            confidence: 0.0,
            original_odds: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.prediction != NO_RULE_MATCH
    }
}

pub struct OddsDecoder {
    config: DecoderConfig,
}

impl OddsDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Whether a commence time falls in the early-season window.
    /// Unparseable times are not early.
    pub fn is_early_season(&self, commence_time: &str) -> bool {
        DateTime::parse_from_rfc3339(commence_time)
            .map(|dt| self.config.early_season_months.contains(&dt.month()))
            .unwrap_or(false)
    }

    /// Decode one price. The price is rounded to 2 decimals before lookup.
    pub fn analyze_odds(&self, odds: f64, early_season: bool) -> OddsAnalysis {
        if !odds.is_finite() {
            return OddsAnalysis::no_match();
        }
        let rounded = round_to(odds, 2);
        if rounded <= 0.0 {
            return OddsAnalysis::no_match();
        }

        let Some(rule) = self.config.rules.iter().find(|r| r.covers(rounded)) else {
            return OddsAnalysis::no_match();
        };

        let boosted = if early_season {
            rule.confidence * self.config.season_boost
        } else {
            rule.confidence
        };

        OddsAnalysis {
            prediction: rule.prediction.clone(),
            confidence: round_to(boosted, 2).clamp(0.0, 1.0),
            original_odds: rounded,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate scoring
// ---------------------------------------------------------------------------

/// confidence × 0.65 + mean(home, away, over 2.5) × 0.35. A missing
/// totals price counts as zero.
pub fn profit_score(confidence: f64, odds: &CandidateOdds) -> f64 {
    let over = odds.over_2_5.unwrap_or(0.0);
    let odds_value = (odds.home + odds.away + over) / 3.0;
    confidence * CONFIDENCE_WEIGHT + odds_value * PRICE_WEIGHT
}

/// Turns matches into curated candidates.
pub struct CandidateScorer {
    decoder: OddsDecoder,
}

impl CandidateScorer {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            decoder: OddsDecoder::new(config),
        }
    }

    pub fn decoder(&self) -> &OddsDecoder {
        &self.decoder
    }

    /// The preferred bookmaker's complete quote, else the first complete one.
    fn pick_quote<'m>(&self, m: &'m ProcessedMatch) -> Option<&'m BookmakerQuote> {
        let preferred = &self.decoder.config.preferred_bookmaker;
        m.bookmakers()
            .iter()
            .find(|q| q.is_complete() && q.key.eq_ignore_ascii_case(preferred))
            .or_else(|| m.bookmakers().iter().find(|q| q.is_complete()))
    }

    pub fn score(&self, m: &ProcessedMatch) -> Option<CuratedCandidate> {
        let Some(quote) = self.pick_quote(m) else {
            debug!(match_id = %m.match_id(), "No complete bookmaker quote");
            return None;
        };
        let odds = CandidateOdds {
            home: quote.price(Outcome::Home)?,
            away: quote.price(Outcome::Away)?,
            draw: quote.price(Outcome::Draw)?,
            over_2_5: None,
        };

        let early = self.decoder.is_early_season(m.commence_time());
        let analysis = self.decoder.analyze_odds(odds.home, early);
        let score = profit_score(analysis.confidence, &odds);

        debug!(
            match_id = %m.match_id(),
            bookmaker = %quote.key,
            prediction = %analysis.prediction,
            confidence = analysis.confidence,
            score = format!("{:.3}", score),
            "Candidate scored"
        );

        Some(CuratedCandidate {
            match_id: m.match_id().to_string(),
            home_team: m.home_team().to_string(),
            away_team: m.away_team().to_string(),
            league: m.league().unwrap_or("Unknown League").to_string(),
            commence_time: m.commence_time().to_string(),
            bookmaker: quote.key.clone(),
            odds,
            analysis,
            profit_score: score,
        })
    }

    /// Score every match, best profit score first.
    pub fn score_all(&self, matches: &[ProcessedMatch]) -> Vec<CuratedCandidate> {
        let mut candidates: Vec<CuratedCandidate> = matches.iter().filter_map(|m| self.score(m)).collect();
        candidates.sort_by(|a, b| b.profit_score.total_cmp(&a.profit_score));
        candidates
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decoder() -> OddsDecoder {
        OddsDecoder::new(DecoderConfig::default())
    }

    fn make_match(commence: &str, quotes: &[(&str, f64, f64, f64)]) -> ProcessedMatch {
        quotes
            .iter()
            .fold(
                ProcessedMatch::builder("Home", "Away", commence).league("EPL"),
                |b, (bm, h, a, d)| b.quote(bm, *h, *a, *d),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_rule_bands_inclusive() {
        let d = decoder();
        assert_eq!(d.analyze_odds(1.10, false).prediction, "under_1.5_ht");
        assert_eq!(d.analyze_odds(1.19, false).prediction, "under_1.5_ht");
        assert_eq!(d.analyze_odds(1.25, false).prediction, "straight_win");
        assert_eq!(d.analyze_odds(3.60, false).prediction, "high_scoring_draw");
    }

    #[test]
    fn test_price_rounded_before_lookup() {
        // 1.194 → 1.19; 1.196 → 1.20
        assert_eq!(decoder().analyze_odds(1.194, false).prediction, "under_1.5_ht");
        assert_eq!(decoder().analyze_odds(1.196, false).prediction, "straight_win");
    }

    #[test]
    fn test_gap_between_bands_has_no_rule() {
        let a = decoder().analyze_odds(1.47, false);
        assert_eq!(a.prediction, NO_RULE_MATCH);
        assert_eq!(a.confidence, 0.0);
        assert!(!a.is_match());
        assert_eq!(decoder().analyze_odds(-2.0, false).prediction, NO_RULE_MATCH);
        assert_eq!(decoder().analyze_odds(f64::NAN, false).prediction, NO_RULE_MATCH);
    }

    #[test]
    fn test_early_season_boost_capped() {
        let d = decoder();
        assert_relative_eq!(d.analyze_odds(1.55, true).confidence, 0.9, epsilon = 1e-12);
        assert_eq!(d.analyze_odds(1.15, true).confidence, 1.0);
        assert_eq!(d.analyze_odds(1.15, false).confidence, 0.95);
    }

    #[test]
    fn test_early_season_window() {
        let d = decoder();
        assert!(d.is_early_season("2026-08-01T15:00:00Z"));
        assert!(d.is_early_season("2026-10-31T20:00:00+01:00"));
        assert!(!d.is_early_season("2026-11-01T12:00:00Z"));
        assert!(!d.is_early_season("not a date"));
        assert!(!d.is_early_season(""));
    }

    #[test]
    fn test_profit_score() {
        let odds = CandidateOdds {
            home: 1.5,
            away: 6.0,
            draw: 4.0,
            over_2_5: None,
        };
        // 0.75 × 0.65 + (7.5 / 3) × 0.35
        assert_relative_eq!(profit_score(0.75, &odds), 0.4875 + 0.875, epsilon = 1e-12);
        let with_totals = CandidateOdds {
            over_2_5: Some(1.5),
            ..odds
        };
        assert_relative_eq!(profit_score(0.75, &with_totals), 0.4875 + 1.05, epsilon = 1e-12);
    }

    #[test]
    fn test_scorer_prefers_bet365() {
        let scorer = CandidateScorer::new(DecoderConfig::default());
        let m = make_match(
            "2026-11-20T15:00:00Z",
            &[("pinnacle", 1.6, 5.5, 4.0), ("bet365", 1.25, 9.0, 5.5)],
        );
        let c = scorer.score(&m).unwrap();
        assert_eq!(c.bookmaker, "bet365");
        assert_eq!(c.odds.home, 1.25);
        assert_eq!(c.analysis.prediction, "straight_win");
        assert_eq!(c.league, "EPL");
    }

    #[test]
    fn test_scorer_falls_back_to_first_quote() {
        let scorer = CandidateScorer::new(DecoderConfig::default());
        let m = make_match(
            "2026-09-20T15:00:00Z",
            &[("pinnacle", 1.55, 5.5, 4.0), ("unibet", 1.25, 9.0, 5.5)],
        );
        let c = scorer.score(&m).unwrap();
        assert_eq!(c.bookmaker, "pinnacle");
        // risky_win 0.75 boosted in September
        assert_relative_eq!(c.analysis.confidence, 0.9, epsilon = 1e-12);
    }
}
