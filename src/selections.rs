//! Conversion of algorithm reports into parlay-ready selections.
//!
//! Every selection is tagged with the producing algorithm and normalised to
//! the match-winner market, so any report can feed an accumulator.

use crate::algorithms::{
    AlgorithmOutput, ArbitrageReport, ComparisonReport, PredictionReport, SimulationReport, StakeReport,
    TrendReport,
};
use crate::types::{AlgorithmKind, Outcome, ScoredSelection, DRAW_OUTCOME_NAME, MATCH_WINNER_MARKET};

fn selection_name<'a>(outcome: Outcome, home_team: &'a str, away_team: &'a str) -> &'a str {
    match outcome {
        Outcome::Home => home_team,
        Outcome::Away => away_team,
        Outcome::Draw => DRAW_OUTCOME_NAME,
    }
}

struct Leg<'a> {
    match_id: &'a str,
    home_team: &'a str,
    away_team: &'a str,
    league: Option<&'a str>,
    outcome: Outcome,
    odds: f64,
    score: f64,
}

impl Leg<'_> {
    fn into_selection(self, algorithm: AlgorithmKind) -> ScoredSelection {
        ScoredSelection {
            match_id: self.match_id.to_string(),
            home_team: self.home_team.to_string(),
            away_team: self.away_team.to_string(),
            league: self.league.map(str::to_string),
            market: MATCH_WINNER_MARKET.to_string(),
            selection: selection_name(self.outcome, self.home_team, self.away_team).to_string(),
            outcome: self.outcome,
            odds: self.odds,
            score: self.score,
            algorithm,
        }
    }
}

/// The recommended market of each trend, scored by trend strength.
pub fn from_trends(report: &TrendReport) -> Vec<ScoredSelection> {
    let TrendReport::Trends { trends } = report else {
        return Vec::new();
    };
    trends
        .iter()
        .map(|(match_id, t)| {
            Leg {
                match_id,
                home_team: &t.home_team,
                away_team: &t.away_team,
                league: t.league.as_deref(),
                outcome: t.recommended_market,
                odds: t.current_odds,
                score: t.trend_strength,
            }
            .into_selection(AlgorithmKind::Arima)
        })
        .collect()
}

/// All three best-price legs of each opportunity, scored by ROI.
pub fn from_arbitrage(report: &ArbitrageReport) -> Vec<ScoredSelection> {
    let ArbitrageReport::Opportunities { opportunities } = report else {
        return Vec::new();
    };
    opportunities
        .iter()
        .flat_map(|o| {
            Outcome::ALL.map(|outcome| {
                Leg {
                    match_id: &o.match_id,
                    home_team: &o.home_team,
                    away_team: &o.away_team,
                    league: o.league.as_deref(),
                    outcome,
                    odds: o.odds(outcome),
                    score: o.roi_pct,
                }
                .into_selection(AlgorithmKind::Arb)
            })
        })
        .collect()
}

/// The home leg of each stake, scored by base edge.
pub fn from_stakes(report: &StakeReport) -> Vec<ScoredSelection> {
    let StakeReport::Recommendations { recommendations } = report else {
        return Vec::new();
    };
    recommendations
        .iter()
        .map(|r| {
            Leg {
                match_id: &r.match_id,
                home_team: &r.home_team,
                away_team: &r.away_team,
                league: r.league.as_deref(),
                outcome: Outcome::Home,
                odds: r.odds,
                score: r.base_edge,
            }
            .into_selection(AlgorithmKind::Kelly)
        })
        .collect()
}

/// The best simulated market of each match, scored by edge.
pub fn from_simulations(report: &SimulationReport) -> Vec<ScoredSelection> {
    let SimulationReport::Results { results } = report else {
        return Vec::new();
    };
    results
        .iter()
        .map(|r| {
            Leg {
                match_id: &r.match_id,
                home_team: &r.home_team,
                away_team: &r.away_team,
                league: r.league.as_deref(),
                outcome: r.market,
                odds: r.odds,
                score: r.edge,
            }
            .into_selection(AlgorithmKind::Monte)
        })
        .collect()
}

/// The predicted side at its median price. "No Clear Favorite" yields nothing.
pub fn from_predictions(report: &PredictionReport) -> Vec<ScoredSelection> {
    let PredictionReport::Predictions { predictions } = report else {
        return Vec::new();
    };
    predictions
        .iter()
        .filter_map(|p| {
            let outcome = p.prediction.outcome()?;
            let odds = p.predicted_odds()?;
            let score = match outcome {
                Outcome::Home => p.home_prob,
                _ => p.away_prob,
            };
            Some(
                Leg {
                    match_id: &p.match_id,
                    home_team: &p.home_team,
                    away_team: &p.away_team,
                    league: p.league.as_deref(),
                    outcome,
                    odds,
                    score,
                }
                .into_selection(AlgorithmKind::Ipt),
            )
        })
        .collect()
}

/// The rated side at its best price, scored by implied probability.
pub fn from_comparison(report: &ComparisonReport) -> Vec<ScoredSelection> {
    report
        .value_bets
        .iter()
        .map(|v| {
            let odds = v.rated_odds();
            Leg {
                match_id: &v.match_id,
                home_team: &v.home_team,
                away_team: &v.away_team,
                league: v.league.as_deref(),
                outcome: v.value_rating.outcome(),
                odds,
                score: 1.0 / odds,
            }
            .into_selection(AlgorithmKind::Value)
        })
        .collect()
}

/// Selections for any report. Sentinels yield an empty list.
pub fn from_output(output: &AlgorithmOutput) -> Vec<ScoredSelection> {
    match output {
        AlgorithmOutput::Trend(r) => from_trends(r),
        AlgorithmOutput::Arbitrage(r) => from_arbitrage(r),
        AlgorithmOutput::Kelly(r) => from_stakes(r),
        AlgorithmOutput::MonteCarlo(r) => from_simulations(r),
        AlgorithmOutput::Threshold(r) => from_predictions(r),
        AlgorithmOutput::Comparison(r) => from_comparison(r),
    }
}
