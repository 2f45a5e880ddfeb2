//! Shared types for BetSage.
//!
//! Raw bookmaker payloads, the canonical `ProcessedMatch` record consumed by
//! every algorithm, the algorithm-agnostic `ScoredSelection`, and the
//! domain error type. Algorithm and parlay modules depend on these without
//! depending on each other.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Minimum number of bookmaker prices per outcome for a match to be usable.
pub const MIN_QUOTES_PER_OUTCOME: usize = 2;

/// Literal outcome name bookmakers use for the draw.
pub const DRAW_OUTCOME_NAME: &str = "Draw";

/// Market key of the head-to-head market.
pub const H2H_MARKET_KEY: &str = "h2h";

/// Market tag carried by selections eligible for accumulators.
pub const MATCH_WINNER_MARKET: &str = "match_winner";

/// Hex characters kept from the match digest.
const MATCH_ID_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Raw payloads (The Odds API v4 shape)
// ---------------------------------------------------------------------------

/// One fixture as returned by the odds provider. Every field is optional
/// so that a partially filled payload still deserialises.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sport_key: Option<String>,
    #[serde(default)]
    pub sport_title: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    /// ISO-8601 kick-off time.
    #[serde(default)]
    pub commence_time: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<RawBookmaker>,
    /// Model-estimated outcome probabilities, when the feed carries them.
    #[serde(default)]
    pub probabilities: Option<RawProbabilities>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProbabilities {
    #[serde(default)]
    pub home: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBookmaker {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub markets: Vec<RawMarket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMarket {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<RawOutcome>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOutcome {
    #[serde(default)]
    pub name: String,
    /// Decimal price. Absent prices are dropped, never defaulted.
    #[serde(default)]
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One leg of the three-way head-to-head market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Outcome {
    /// All outcomes in canonical order.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Away, Outcome::Draw];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Home => write!(f, "HOME"),
            Outcome::Away => write!(f, "AWAY"),
            Outcome::Draw => write!(f, "DRAW"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bookmaker quote
// ---------------------------------------------------------------------------

/// One bookmaker's head-to-head prices for a match. Any price may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerQuote {
    pub key: String,
    pub home: Option<f64>,
    pub away: Option<f64>,
    pub draw: Option<f64>,
}

impl BookmakerQuote {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            home: None,
            away: None,
            draw: None,
        }
    }

    pub fn price(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Away => self.away,
            Outcome::Draw => self.draw,
        }
    }

    fn set_price(&mut self, outcome: Outcome, price: f64) {
        match outcome {
            Outcome::Home => self.home = Some(price),
            Outcome::Away => self.away = Some(price),
            Outcome::Draw => self.draw = Some(price),
        }
    }

    /// Whether all three prices are present.
    pub fn is_complete(&self) -> bool {
        self.home.is_some() && self.away.is_some() && self.draw.is_some()
    }
}

// ---------------------------------------------------------------------------
// ProcessedMatch
// ---------------------------------------------------------------------------

/// Canonical per-match record consumed by every algorithm.
///
/// Only constructible through [`ProcessedMatchBuilder::build`], which
/// rejects matches with fewer than [`MIN_QUOTES_PER_OUTCOME`] prices on any
/// side. Never mutated after construction, except for attaching an external
/// model probability via [`ProcessedMatch::with_home_probability`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedMatch {
    match_id: String,
    home_team: String,
    away_team: String,
    commence_time: String,
    league: Option<String>,
    home_odds: Vec<f64>,
    away_odds: Vec<f64>,
    draw_odds: Vec<f64>,
    bookmakers: Vec<BookmakerQuote>,
    home_probability: Option<f64>,
}

impl ProcessedMatch {
    pub fn builder(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        commence_time: impl Into<String>,
    ) -> ProcessedMatchBuilder {
        ProcessedMatchBuilder::new(home_team, away_team, commence_time)
    }

    /// Stable content digest of `(home_team, away_team, commence_time)`.
    pub fn compute_id(home_team: &str, away_team: &str, commence_time: &str) -> String {
        let digest = Sha256::digest(format!("{home_team}|{away_team}|{commence_time}").as_bytes());
        digest
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()[..MATCH_ID_LEN]
            .to_string()
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    pub fn commence_time(&self) -> &str {
        &self.commence_time
    }

    pub fn league(&self) -> Option<&str> {
        self.league.as_deref()
    }

    pub fn home_odds(&self) -> &[f64] {
        &self.home_odds
    }

    pub fn away_odds(&self) -> &[f64] {
        &self.away_odds
    }

    pub fn draw_odds(&self) -> &[f64] {
        &self.draw_odds
    }

    /// Price sequence for an outcome, in bookmaker arrival order.
    pub fn odds(&self, outcome: Outcome) -> &[f64] {
        match outcome {
            Outcome::Home => &self.home_odds,
            Outcome::Away => &self.away_odds,
            Outcome::Draw => &self.draw_odds,
        }
    }

    /// Per-bookmaker records in arrival order.
    pub fn bookmakers(&self) -> &[BookmakerQuote] {
        &self.bookmakers
    }

    /// Team name for an outcome; `"Draw"` for the draw.
    pub fn team_for(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Home => &self.home_team,
            Outcome::Away => &self.away_team,
            Outcome::Draw => DRAW_OUTCOME_NAME,
        }
    }

    /// Externally estimated home-win probability, required by stake sizing.
    pub fn home_probability(&self) -> Option<f64> {
        self.home_probability
    }

    /// Attach a model-estimated home-win probability.
    pub fn with_home_probability(mut self, probability: f64) -> Self {
        self.home_probability = Some(probability);
        self
    }

    /// Highest price for an outcome across bookmaker records.
    pub fn best_quote(&self, outcome: Outcome) -> Option<f64> {
        self.bookmakers
            .iter()
            .filter_map(|bm| bm.price(outcome))
            .fold(None, |best: Option<f64>, p| match best {
                Some(b) if b >= p => Some(b),
                _ => Some(p),
            })
    }

    /// Bookmaker keys quoting exactly `price` for an outcome, in arrival order.
    pub fn bookmakers_at(&self, outcome: Outcome, price: f64) -> Vec<&str> {
        self.bookmakers
            .iter()
            .filter(|bm| bm.price(outcome) == Some(price))
            .map(|bm| bm.key.as_str())
            .collect()
    }
}

impl fmt::Display for ProcessedMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} vs {} ({} bookmakers, {})",
            self.match_id,
            self.home_team,
            self.away_team,
            self.bookmakers.len(),
            self.commence_time,
        )
    }
}

/// Accumulates bookmaker prices for one fixture.
#[derive(Debug, Clone)]
pub struct ProcessedMatchBuilder {
    home_team: String,
    away_team: String,
    commence_time: String,
    league: Option<String>,
    home_odds: Vec<f64>,
    away_odds: Vec<f64>,
    draw_odds: Vec<f64>,
    bookmakers: Vec<BookmakerQuote>,
}

impl ProcessedMatchBuilder {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        commence_time: impl Into<String>,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            commence_time: commence_time.into(),
            league: None,
            home_odds: Vec::new(),
            away_odds: Vec::new(),
            draw_odds: Vec::new(),
            bookmakers: Vec::new(),
        }
    }

    pub fn league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    /// Register a bookmaker. A repeated key resets that bookmaker's record
    /// in place; prices already appended to the outcome lists stay.
    pub fn open_bookmaker(&mut self, key: &str) {
        match self.bookmakers.iter_mut().find(|bm| bm.key == key) {
            Some(existing) => *existing = BookmakerQuote::new(key),
            None => self.bookmakers.push(BookmakerQuote::new(key)),
        }
    }

    /// Record one price for `bookmaker`. Prices must be finite and above 1.0;
    /// anything else is ignored and `false` returned.
    pub fn record(&mut self, bookmaker: &str, outcome: Outcome, price: f64) -> bool {
        if !price.is_finite() || price <= 1.0 {
            return false;
        }
        if !self.bookmakers.iter().any(|bm| bm.key == bookmaker) {
            self.bookmakers.push(BookmakerQuote::new(bookmaker));
        }
        if let Some(bm) = self.bookmakers.iter_mut().find(|bm| bm.key == bookmaker) {
            bm.set_price(outcome, price);
        }
        match outcome {
            Outcome::Home => self.home_odds.push(price),
            Outcome::Away => self.away_odds.push(price),
            Outcome::Draw => self.draw_odds.push(price),
        }
        true
    }

    /// Convenience: record a full `{home, away, draw}` quote.
    pub fn quote(mut self, bookmaker: &str, home: f64, away: f64, draw: f64) -> Self {
        self.open_bookmaker(bookmaker);
        self.record(bookmaker, Outcome::Home, home);
        self.record(bookmaker, Outcome::Away, away);
        self.record(bookmaker, Outcome::Draw, draw);
        self
    }

    pub fn match_id(&self) -> String {
        ProcessedMatch::compute_id(&self.home_team, &self.away_team, &self.commence_time)
    }

    pub fn build(self) -> Result<ProcessedMatch, BetSageError> {
        let match_id = self.match_id();
        if self.home_odds.len() < MIN_QUOTES_PER_OUTCOME
            || self.away_odds.len() < MIN_QUOTES_PER_OUTCOME
            || self.draw_odds.len() < MIN_QUOTES_PER_OUTCOME
        {
            return Err(BetSageError::InsufficientQuotes {
                match_id,
                home: self.home_odds.len(),
                away: self.away_odds.len(),
                draw: self.draw_odds.len(),
            });
        }
        Ok(ProcessedMatch {
            match_id,
            home_team: self.home_team,
            away_team: self.away_team,
            commence_time: self.commence_time,
            league: self.league,
            home_odds: self.home_odds,
            away_odds: self.away_odds,
            draw_odds: self.draw_odds,
            bookmakers: self.bookmakers,
            home_probability: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Algorithm kind
// ---------------------------------------------------------------------------

/// The six scoring algorithms, keyed by their short CLI names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    /// Moving-average trend analysis.
    Arima,
    /// Cross-bookmaker arbitrage.
    Arb,
    /// Fractional-Kelly stake sizing.
    Kelly,
    /// Monte Carlo outcome simulation.
    Monte,
    /// Implied-probability threshold prediction.
    Ipt,
    /// Best-price odds comparison.
    Value,
}

impl AlgorithmKind {
    pub const ALL: &'static [AlgorithmKind] = &[
        AlgorithmKind::Arima,
        AlgorithmKind::Arb,
        AlgorithmKind::Kelly,
        AlgorithmKind::Monte,
        AlgorithmKind::Ipt,
        AlgorithmKind::Value,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AlgorithmKind::Arima => "arima",
            AlgorithmKind::Arb => "arb",
            AlgorithmKind::Kelly => "kelly",
            AlgorithmKind::Monte => "monte",
            AlgorithmKind::Ipt => "ipt",
            AlgorithmKind::Value => "value",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for AlgorithmKind {
    type Err = BetSageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arima" | "trend" => Ok(AlgorithmKind::Arima),
            "arb" | "arbitrage" => Ok(AlgorithmKind::Arb),
            "kelly" => Ok(AlgorithmKind::Kelly),
            "monte" | "montecarlo" | "monte_carlo" => Ok(AlgorithmKind::Monte),
            "ipt" | "threshold" => Ok(AlgorithmKind::Ipt),
            "value" | "ocm" => Ok(AlgorithmKind::Value),
            _ => Err(BetSageError::UnknownAlgorithm(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Scored selection
// ---------------------------------------------------------------------------

/// Algorithm-agnostic recommendation unit fed to the parlay builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSelection {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub league: Option<String>,
    /// Market tag; accumulators only accept [`MATCH_WINNER_MARKET`].
    pub market: String,
    /// Team name or `"Draw"`.
    pub selection: String,
    pub outcome: Outcome,
    /// Decimal price at recommendation time.
    pub odds: f64,
    /// Confidence or edge, depending on the producing algorithm.
    pub score: f64,
    pub algorithm: AlgorithmKind,
}

impl fmt::Display for ScoredSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} | {} @ {:.2} [{}]",
            self.home_team, self.away_team, self.selection, self.odds, self.algorithm,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Contract violations raised by the core. Per-record input defects are
/// skipped and logged instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BetSageError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Insufficient quotes for {match_id}: home={home} away={away} draw={draw}")]
    InsufficientQuotes {
        match_id: String,
        home: usize,
        away: usize,
        draw: usize,
    },

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Unknown league: {0}")]
    UnknownLeague(String),
}

impl BetSageError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BetSageError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match() -> ProcessedMatch {
        ProcessedMatch::builder("A", "B", "2026-10-14T19:00:00Z")
            .quote("bm1", 2.5, 2.8, 3.1)
            .quote("bm2", 2.6, 2.7, 3.2)
            .build()
            .unwrap()
    }

    #[test]
    fn test_match_id_is_stable_and_fixed_length() {
        let a = ProcessedMatch::compute_id("A", "B", "2026-10-14T19:00:00Z");
        let b = ProcessedMatch::compute_id("A", "B", "2026-10-14T19:00:00Z");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_match_id_differs_per_fixture() {
        let a = ProcessedMatch::compute_id("A", "B", "2026-10-14T19:00:00Z");
        let b = ProcessedMatch::compute_id("B", "A", "2026-10-14T19:00:00Z");
        let c = ProcessedMatch::compute_id("A", "B", "2026-10-15T19:00:00Z");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_builder_collects_prices_in_order() {
        let m = make_match();
        assert_eq!(m.home_odds(), &[2.5, 2.6]);
        assert_eq!(m.away_odds(), &[2.8, 2.7]);
        assert_eq!(m.draw_odds(), &[3.1, 3.2]);
        assert_eq!(m.bookmakers().len(), 2);
        assert_eq!(m.bookmakers()[0].key, "bm1");
    }

    #[test]
    fn test_builder_rejects_single_quote() {
        let err = ProcessedMatch::builder("A", "B", "t")
            .quote("bm1", 2.5, 2.8, 3.1)
            .build()
            .unwrap_err();
        assert!(matches!(err, BetSageError::InsufficientQuotes { home: 1, .. }));
    }

    #[test]
    fn test_builder_ignores_invalid_prices() {
        let mut b = ProcessedMatch::builder("A", "B", "t");
        assert!(!b.record("bm1", Outcome::Home, 1.0));
        assert!(!b.record("bm1", Outcome::Home, -2.0));
        assert!(!b.record("bm1", Outcome::Home, f64::NAN));
        assert!(b.record("bm1", Outcome::Home, 1.5));
    }

    #[test]
    fn test_repeated_bookmaker_resets_record() {
        let mut b = ProcessedMatch::builder("A", "B", "t");
        b.open_bookmaker("bm1");
        b.record("bm1", Outcome::Home, 2.0);
        b.open_bookmaker("bm1");
        b.record("bm1", Outcome::Away, 3.0);
        let b = b.quote("bm2", 2.1, 3.1, 3.3).quote("bm3", 2.2, 3.2, 3.4);
        let m = b.build().unwrap();
        assert_eq!(m.bookmakers()[0].home, None);
        assert_eq!(m.bookmakers()[0].away, Some(3.0));
        assert_eq!(m.home_odds(), &[2.0, 2.1, 2.2]);
    }

    #[test]
    fn test_best_quote_and_bookmakers_at() {
        let m = make_match();
        assert_eq!(m.best_quote(Outcome::Home), Some(2.6));
        assert_eq!(m.best_quote(Outcome::Away), Some(2.8));
        assert_eq!(m.bookmakers_at(Outcome::Home, 2.6), vec!["bm2"]);
        assert_eq!(m.bookmakers_at(Outcome::Away, 2.8), vec!["bm1"]);
    }

    #[test]
    fn test_team_for() {
        let m = make_match();
        assert_eq!(m.team_for(Outcome::Home), "A");
        assert_eq!(m.team_for(Outcome::Away), "B");
        assert_eq!(m.team_for(Outcome::Draw), "Draw");
    }

    #[test]
    fn test_with_home_probability() {
        let m = make_match().with_home_probability(0.55);
        assert_eq!(m.home_probability(), Some(0.55));
    }

    #[test]
    fn test_algorithm_kind_from_str() {
        assert_eq!("arima".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Arima);
        assert_eq!("ARB".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Arb);
        assert_eq!("ocm".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Value);
        assert!(matches!(
            "nope".parse::<AlgorithmKind>(),
            Err(BetSageError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_algorithm_kind_display_roundtrip() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.to_string().parse::<AlgorithmKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_string(&Outcome::Home).unwrap(), "\"HOME\"");
        let parsed: Outcome = serde_json::from_str("\"DRAW\"").unwrap();
        assert_eq!(parsed, Outcome::Draw);
    }

    #[test]
    fn test_raw_match_tolerates_missing_fields() {
        let raw: RawMatch = serde_json::from_str(r#"{"bookmakers": [{"key": "bm1"}]}"#).unwrap();
        assert!(raw.home_team.is_none());
        assert_eq!(raw.bookmakers.len(), 1);
        assert!(raw.bookmakers[0].markets.is_empty());
    }

    #[test]
    fn test_error_display() {
        let e = BetSageError::invalid("bankroll", "must be positive");
        assert_eq!(format!("{e}"), "Invalid parameter bankroll: must be positive");
    }
}
