//! In-memory odds source and payload builders.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;

use betsage::odds::OddsSource;

/// Serves canned payloads per league key. Unknown keys fail, as an API
/// would for an unsupported sport.
pub struct StaticSource {
    leagues: HashMap<String, Vec<Value>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            leagues: HashMap::new(),
        }
    }

    pub fn with_league(mut self, key: &str, matches: Vec<Value>) -> Self {
        self.leagues.insert(key.to_string(), matches);
        self
    }
}

#[async_trait]
impl OddsSource for StaticSource {
    async fn fetch_league(&self, league_key: &str) -> Result<Vec<Value>> {
        self.leagues
            .get(league_key)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown sport: {league_key}"))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// A raw match with one h2h market per `(bookmaker, home, away, draw)`.
pub fn raw_match(league: &str, home: &str, away: &str, commence: &str, quotes: &[(&str, f64, f64, f64)]) -> Value {
    let bookmakers: Vec<Value> = quotes
        .iter()
        .map(|(bm, h, a, d)| {
            json!({
                "key": bm,
                "title": bm,
                "markets": [{
                    "key": "h2h",
                    "outcomes": [
                        {"name": home, "price": h},
                        {"name": away, "price": a},
                        {"name": "Draw", "price": d}
                    ]
                }]
            })
        })
        .collect();
    json!({
        "id": format!("{home}-{away}"),
        "sport_key": league.to_lowercase().replace(' ', "_"),
        "sport_title": league,
        "home_team": home,
        "away_team": away,
        "commence_time": commence,
        "bookmakers": bookmakers
    })
}
