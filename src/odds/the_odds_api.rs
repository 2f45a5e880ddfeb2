//! The Odds API v4 client.
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Endpoint: `GET {base_url}/sports/{sport_key}/odds`
//! Auth: `apiKey` query parameter. Quota is per request, so leagues are
//! fetched once per analysis run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use super::OddsSource;
use crate::config::OddsApiConfig;

const SOURCE_NAME: &str = "the-odds-api";

/// HTTP odds source for The Odds API.
pub struct TheOddsApiClient {
    http: Client,
    api_key: Secret<String>,
    base_url: String,
    regions: String,
    markets: String,
    odds_format: String,
}

impl TheOddsApiClient {
    pub fn new(api_key: String, config: &OddsApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("BetSage/0.1.0")
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            api_key: Secret::new(api_key),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            regions: config.regions.clone(),
            markets: config.markets.clone(),
            odds_format: config.odds_format.clone(),
        })
    }

    fn odds_url(&self, league_key: &str) -> String {
        format!("{}/sports/{league_key}/odds", self.base_url)
    }
}

#[async_trait]
impl OddsSource for TheOddsApiClient {
    async fn fetch_league(&self, league_key: &str) -> Result<Vec<Value>> {
        let url = self.odds_url(league_key);
        debug!(url = %url, "Fetching odds");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.expose_secret().as_str()),
                ("regions", self.regions.as_str()),
                ("markets", self.markets.as_str()),
                ("oddsFormat", self.odds_format.as_str()),
            ])
            .send()
            .await
            .context("Odds API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(league = league_key, %status, "Odds API error");
            anyhow::bail!("Odds API error {status}: {body}");
        }

        let matches: Vec<Value> = resp
            .json()
            .await
            .context("Failed to parse Odds API response")?;

        info!(league = league_key, count = matches.len(), "Fetched matches");
        Ok(matches)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
