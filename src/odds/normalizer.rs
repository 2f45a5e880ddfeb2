//! Odds normalisation.
//!
//! Turns heterogeneous raw bookmaker payloads into canonical
//! `ProcessedMatch` records. Only the `h2h` market is read; outcomes are
//! classified by exact name match against the home team, the away team and
//! the literal `"Draw"`. Malformed or incomplete matches are logged and
//! skipped; normalisation never fails its caller.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::{
    Outcome, ProcessedMatch, ProcessedMatchBuilder, RawMatch, DRAW_OUTCOME_NAME, H2H_MARKET_KEY,
};

/// Team name used when the payload omits one.
pub const UNKNOWN_TEAM: &str = "Unknown";

/// Bookmaker key used when the payload omits one.
const UNKNOWN_BOOKMAKER: &str = "unknown";

/// Normalise typed raw matches.
pub fn normalize(raw_matches: &[RawMatch]) -> Vec<ProcessedMatch> {
    let processed: Vec<ProcessedMatch> = raw_matches.iter().filter_map(normalize_match).collect();
    info!(
        raw = raw_matches.len(),
        valid = processed.len(),
        "Preprocessed matches"
    );
    processed
}

/// Normalise untyped JSON payloads. Each entry is deserialised on its own,
/// so one malformed match does not sink the batch.
pub fn normalize_payload(payload: &[Value]) -> Vec<ProcessedMatch> {
    let raw: Vec<RawMatch> = payload
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<RawMatch>(value.clone()) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(index = idx, error = %e, "Malformed match entry skipped");
                None
            }
        })
        .collect();
    normalize(&raw)
}

/// Normalise a single raw match, or `None` if it has too few prices.
pub fn normalize_match(raw: &RawMatch) -> Option<ProcessedMatch> {
    let home_team = non_empty(raw.home_team.as_deref()).unwrap_or(UNKNOWN_TEAM);
    let away_team = non_empty(raw.away_team.as_deref()).unwrap_or(UNKNOWN_TEAM);
    let commence_time = raw.commence_time.as_deref().unwrap_or_default();

    let mut builder = ProcessedMatchBuilder::new(home_team, away_team, commence_time);
    if let Some(league) = raw.sport_title.as_deref().or(raw.sport_key.as_deref()) {
        builder = builder.league(league);
    }

    for bookmaker in &raw.bookmakers {
        let key = bookmaker.key.as_deref().unwrap_or(UNKNOWN_BOOKMAKER);
        builder.open_bookmaker(key);

        for market in bookmaker.markets.iter().filter(|m| m.key == H2H_MARKET_KEY) {
            for outcome in &market.outcomes {
                let Some(side) = classify(&outcome.name, home_team, away_team) else {
                    debug!(bookmaker = key, name = %outcome.name, "Unmatched outcome discarded");
                    continue;
                };
                let Some(price) = outcome.price else {
                    debug!(bookmaker = key, name = %outcome.name, "Outcome without price");
                    continue;
                };
                if !builder.record(key, side, price) {
                    debug!(bookmaker = key, name = %outcome.name, price, "Invalid price discarded");
                }
            }
        }
    }

    match builder.build() {
        Ok(m) => match raw.probabilities.as_ref().and_then(|p| p.home) {
            Some(p) => Some(m.with_home_probability(p)),
            None => Some(m),
        },
        Err(e) => {
            warn!(error = %e, "Insufficient odds, match skipped");
            None
        }
    }
}

/// Classify an outcome name. Home takes precedence when both team names
/// coincide.
fn classify(name: &str, home_team: &str, away_team: &str) -> Option<Outcome> {
    if name == home_team {
        Some(Outcome::Home)
    } else if name == away_team {
        Some(Outcome::Away)
    } else if name == DRAW_OUTCOME_NAME {
        Some(Outcome::Draw)
    } else {
        None
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
