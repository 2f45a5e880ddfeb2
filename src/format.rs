//! Plain-text rendering of reports and parlays for the terminal.
//!
//! Reports carry unrounded numbers; all rounding happens here.

use crate::algorithms::{
    AlgorithmOutput, ArbitrageReport, ComparisonReport, PredictionReport, SimulationReport, StakeReport,
    TrendReport,
};
use crate::engine::PipelineOutput;
use crate::parlay::{BuildOutcome, CuratedParlay};

pub const NO_INSIGHTS: &str = "No actionable insights found";

/// A probability in [0, 1] as a whole percentage, clamped to 0–100.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

/// Decimal odds with two places, floored at 1.00.
pub fn format_odds(odds: f64) -> String {
    format!("{:.2}", odds.max(1.0))
}

fn title_case(s: &str) -> String {
    s.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serde label of a unit enum value (`"strong_buy"`, `"rising"`, ...).
fn label<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn section(lines: &mut Vec<String>, title: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    lines.extend(items.into_iter().map(|item| format!("• {item}")));
}

fn render_trends(report: &TrendReport, lines: &mut Vec<String>) {
    let TrendReport::Trends { trends } = report else {
        return;
    };
    let items = trends
        .values()
        .map(|t| {
            format!(
                "{} vs {}\n  Market: {} ({})\n  Trend: {} | Odds: {}\n  Volatility: {:.2} | Rec: {}",
                t.home_team,
                t.away_team,
                t.recommended_market,
                t.recommended_team,
                title_case(&label(&t.trend)),
                format_odds(t.current_odds),
                t.volatility,
                title_case(&label(&t.recommendation)),
            )
        })
        .collect();
    section(lines, "Trend Recommendations", items);
}

fn render_arbitrage(report: &ArbitrageReport, lines: &mut Vec<String>) {
    let ArbitrageReport::Opportunities { opportunities } = report else {
        return;
    };
    let items = opportunities
        .iter()
        .map(|o| {
            format!(
                "{} vs {}\n  ROI: {:.1}%\n  Home {} ({}) | Away {} ({}) | Draw {} ({})",
                o.home_team,
                o.away_team,
                o.potential_return().max(0.0),
                format_odds(o.home_odds),
                o.home_bookmakers.join(", "),
                format_odds(o.away_odds),
                o.away_bookmakers.join(", "),
                format_odds(o.draw_odds),
                o.draw_bookmakers.join(", "),
            )
        })
        .collect();
    section(lines, "Arbitrage Opportunities", items);
}

fn render_stakes(report: &StakeReport, lines: &mut Vec<String>) {
    let StakeReport::Recommendations { recommendations } = report else {
        return;
    };
    let items = recommendations
        .iter()
        .map(|r| {
            format!(
                "{} vs {}\n  Market: HOME @ {} ({})\n  Stake: {:.2} ({:.1}% of bankroll) | Edge: {:.1}%",
                r.home_team,
                r.away_team,
                format_odds(r.odds),
                r.bookmaker,
                r.recommended_stake,
                r.bankroll_usage,
                r.base_edge * 100.0,
            )
        })
        .collect();
    section(lines, "Kelly Optimal Stakes", items);
}

fn render_simulations(report: &SimulationReport, lines: &mut Vec<String>) {
    let SimulationReport::Results { results } = report else {
        return;
    };
    let items = results
        .iter()
        .map(|r| {
            format!(
                "{} vs {}\n  Market: {} ({})\n  Odds: {} | Win Prob: {}\n  Stake: {:.1}% | Value: {}",
                r.home_team,
                r.away_team,
                r.market,
                r.team,
                format_odds(r.odds),
                format_percentage(r.win_probability),
                r.recommended_stake_pct,
                title_case(&label(&r.value_rating)),
            )
        })
        .collect();
    section(lines, "Monte Carlo Value Picks", items);
}

fn render_predictions(report: &PredictionReport, lines: &mut Vec<String>) {
    let PredictionReport::Predictions { predictions } = report else {
        return;
    };
    let items = predictions
        .iter()
        .map(|p| {
            format!(
                "{} vs {}\n  Prediction: {}\n  Home: {} | Away: {}",
                p.home_team,
                p.away_team,
                p.prediction,
                format_percentage(p.home_prob),
                format_percentage(p.away_prob),
            )
        })
        .collect();
    section(lines, "Threshold Predictions", items);
}

fn render_comparison(report: &ComparisonReport, lines: &mut Vec<String>) {
    let items = report
        .value_bets
        .iter()
        .map(|v| {
            format!(
                "{} vs {}\n  Best Home: {} ({}) | Best Away: {} ({})\n  Value: {}",
                v.home_team,
                v.away_team,
                format_odds(v.best_home_odds),
                v.home_bookmaker.as_deref().unwrap_or("N/A"),
                format_odds(v.best_away_odds),
                v.away_bookmaker.as_deref().unwrap_or("N/A"),
                label(&v.value_rating),
            )
        })
        .collect();
    section(lines, "Value Bet Recommendations", items);
}

/// Render one algorithm report. Sentinels render as their message.
pub fn render_output(output: &AlgorithmOutput) -> String {
    if let Some(sentinel) = output.sentinel() {
        return sentinel.message().to_string();
    }

    let mut lines = Vec::new();
    match output {
        AlgorithmOutput::Trend(r) => render_trends(r, &mut lines),
        AlgorithmOutput::Arbitrage(r) => render_arbitrage(r, &mut lines),
        AlgorithmOutput::Kelly(r) => render_stakes(r, &mut lines),
        AlgorithmOutput::MonteCarlo(r) => render_simulations(r, &mut lines),
        AlgorithmOutput::Threshold(r) => render_predictions(r, &mut lines),
        AlgorithmOutput::Comparison(r) => render_comparison(r, &mut lines),
    }

    if lines.is_empty() {
        NO_INSIGHTS.to_string()
    } else {
        lines.join("\n").trim_start().to_string()
    }
}

pub fn render_pipeline(league: &str, output: &PipelineOutput) -> String {
    let body = match output {
        PipelineOutput::NoData => "No fixtures available".to_string(),
        PipelineOutput::NoValidMatches { fetched } => {
            format!("No valid matches ({fetched} fetched, none with enough quotes)")
        }
        PipelineOutput::Report(report) => render_output(report),
    };
    format!("== {league} ==\n{body}")
}

pub fn render_accumulator(outcome: &BuildOutcome) -> String {
    match outcome {
        BuildOutcome::Built(combination) => {
            let mut lines = vec![combination.to_string()];
            lines.extend(combination.legs().iter().map(|leg| {
                format!(
                    "• {} vs {}: {} @ {} [{}]",
                    leg.selection.home_team,
                    leg.selection.away_team,
                    leg.selection.selection,
                    format_odds(leg.accepted_odds),
                    leg.selection.algorithm,
                )
            }));
            lines.join("\n")
        }
        BuildOutcome::NoSelections => "No valid selections to build a parlay from".to_string(),
        BuildOutcome::NoValidParlay { attempts } => {
            format!("No valid parlay found after {attempts} attempts")
        }
    }
}

pub fn render_curated(parlay: &CuratedParlay) -> String {
    if parlay.is_empty() {
        return NO_INSIGHTS.to_string();
    }
    let mut lines = vec![format!(
        "Curated parlay: {} legs, odds {}, confidence {}{}",
        parlay.legs.len(),
        format_odds(parlay.total_odds),
        format_percentage(parlay.confidence),
        if parlay.fallback { " (target band not reached)" } else { "" },
    )];
    lines.extend(parlay.legs.iter().map(|leg| {
        format!(
            "• {} vs {} [{}]: {} @ {} ({})",
            leg.home_team,
            leg.away_team,
            leg.league,
            title_case(&leg.analysis.prediction),
            format_odds(leg.odds.home),
            format_percentage(leg.analysis.confidence),
        )
    }));
    lines.join("\n")
}
