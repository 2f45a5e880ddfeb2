//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section falls back to its defaults, so a partial file is fine. Secrets
//! (the odds API key) are referenced by env-var name and resolved at
//! runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::algorithms::kelly::KellyConfig;
use crate::algorithms::monte_carlo::MonteCarloConfig;
use crate::algorithms::threshold::ThresholdConfig;
use crate::parlay::accumulator::AccumulatorConfig;
use crate::parlay::curated::CuratedConfig;
use crate::parlay::decoder::DecoderConfig;
use crate::types::BetSageError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub odds_api: OddsApiConfig,
    /// League display name → API sport key.
    pub leagues: BTreeMap<String, String>,
    pub kelly: KellyConfig,
    pub monte_carlo: MonteCarloConfig,
    pub threshold: ThresholdConfig,
    pub accumulator: AccumulatorConfig,
    pub curated: CuratedConfig,
    pub decoder: DecoderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsApiConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub regions: String,
    pub markets: String,
    pub odds_format: String,
    pub timeout_secs: u64,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            api_key_env: "ODDS_API_KEY".to_string(),
            regions: "eu".to_string(),
            markets: "h2h".to_string(),
            odds_format: "decimal".to_string(),
            timeout_secs: 25,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration, or use defaults when the file does not exist.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Directory view over the `[leagues]` table.
    pub fn league_directory(&self) -> LeagueDirectory<'_> {
        LeagueDirectory {
            leagues: &self.leagues,
        }
    }
}

/// Resolves user-facing league names to API sport keys.
pub struct LeagueDirectory<'a> {
    leagues: &'a BTreeMap<String, String>,
}

impl LeagueDirectory<'_> {
    /// Accepts a display name (case-insensitive) or a sport key that is
    /// already present in the table. Keys shaped like API sport keys
    /// (`soccer_epl`) pass through when the table is empty.
    pub fn resolve(&self, league: &str) -> Result<String, BetSageError> {
        if let Some((_, key)) = self
            .leagues
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(league))
        {
            return Ok(key.clone());
        }
        if self.leagues.values().any(|key| key == league) {
            return Ok(league.to_string());
        }
        if self.leagues.is_empty() && league.contains('_') {
            return Ok(league.to_string());
        }
        Err(BetSageError::UnknownLeague(league.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [odds_api]
        regions = "uk"

        [leagues]
        "English Premier League (EPL)" = "soccer_epl"
        "La Liga" = "soccer_spain_la_liga"

        [kelly]
        bankroll = 500.0

        [monte_carlo]
        simulations = 2000
        seed = 7

        [accumulator]
        max_total_odds = 30.0
    "#;

    #[test]
    fn test_parse_partial_config() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.odds_api.regions, "uk");
        assert_eq!(cfg.odds_api.markets, "h2h");
        assert_eq!(cfg.kelly.bankroll, 500.0);
        assert_eq!(cfg.kelly.fractional_kelly, 0.5);
        assert_eq!(cfg.monte_carlo.simulations, 2000);
        assert_eq!(cfg.monte_carlo.seed, Some(7));
        assert_eq!(cfg.accumulator.max_total_odds, 30.0);
        assert_eq!(cfg.accumulator.min_total_odds, 10.0);
        assert!(!cfg.decoder.rules.is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.threshold.threshold, 0.4);
        assert_eq!(cfg.curated.max_legs, 5);
        assert!(cfg.leagues.is_empty());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = AppConfig::load_or_default("/no/such/betsage.toml").unwrap();
        assert_eq!(cfg.odds_api.api_key_env, "ODDS_API_KEY");
    }

    #[test]
    fn test_league_directory_resolution() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        let dir = cfg.league_directory();
        assert_eq!(dir.resolve("la liga").unwrap(), "soccer_spain_la_liga");
        assert_eq!(dir.resolve("soccer_epl").unwrap(), "soccer_epl");
        assert!(matches!(
            dir.resolve("Serie A"),
            Err(BetSageError::UnknownLeague(_))
        ));
    }

    #[test]
    fn test_league_directory_passthrough_when_empty() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.league_directory().resolve("soccer_epl").unwrap(), "soccer_epl");
        assert!(cfg.league_directory().resolve("Premier").is_err());
    }

    #[test]
    fn test_load_sample_config() {
        // Requires config.toml in the working directory (the crate root
        // under `cargo test`).
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert!(cfg.kelly.fractional_kelly > 0.0);
            assert!(cfg.kelly.fractional_kelly <= 1.0);
            assert!(cfg.leagues.contains_key("English Premier League (EPL)"));
        }
    }
}
