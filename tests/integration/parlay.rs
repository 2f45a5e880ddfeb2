//! Scored selections and decoder candidates into parlays.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use betsage::engine::{AlgorithmSettings, MatchBatch, Pipeline, PipelineOutput};
use betsage::format;
use betsage::parlay::{
    AccumulatorBuilder, AccumulatorConfig, BuildOutcome, CandidateScorer, CuratedBuilder, CuratedConfig,
    DecoderConfig,
};
use betsage::selections;
use betsage::types::{AlgorithmKind, ProcessedMatch, ScoredSelection};

use crate::fixtures::{raw_match, StaticSource};

// November: outside the default early-season window.
const KICKOFF: &str = "2026-11-21T15:00:00Z";

async fn load(source: &StaticSource, key: &str) -> Vec<ProcessedMatch> {
    let batch = Pipeline::new(AlgorithmSettings::default())
        .fetch(source, key)
        .await
        .unwrap();
    match batch {
        MatchBatch::Matches(matches) => matches,
        other => panic!("expected matches, got {other:?}"),
    }
}

async fn value_selections() -> Vec<ScoredSelection> {
    let source = StaticSource::new().with_league(
        "soccer_epl",
        vec![
            raw_match("EPL", "Arsenal", "Burnley", KICKOFF, &[("bm1", 2.0, 1.8, 3.4), ("bm2", 1.9, 1.7, 3.5)]),
            raw_match("EPL", "Chelsea", "Everton", KICKOFF, &[("bm1", 2.1, 1.8, 3.4), ("bm2", 2.0, 1.7, 3.5)]),
            raw_match("EPL", "Fulham", "Brentford", KICKOFF, &[("bm1", 2.2, 1.8, 3.4), ("bm2", 2.1, 1.7, 3.5)]),
            raw_match("EPL", "Spurs", "Wolves", KICKOFF, &[("bm1", 2.3, 1.8, 3.4), ("bm2", 2.2, 1.7, 3.5)]),
            // Rated side above the per-leg cap.
            raw_match("EPL", "Leeds", "Forest", KICKOFF, &[("bm1", 5.0, 1.6, 3.9), ("bm2", 4.8, 1.5, 4.0)]),
        ],
    );
    let pipeline = Pipeline::new(AlgorithmSettings::default());
    let out = pipeline
        .run(&source, "soccer_epl", AlgorithmKind::Value, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();
    let PipelineOutput::Report(report) = &out else {
        panic!("expected a report, got {out:?}");
    };
    selections::from_output(report)
}

#[tokio::test]
async fn test_value_picks_into_accumulator() {
    let picks = value_selections().await;
    assert_eq!(picks.len(), 5);

    let builder = AccumulatorBuilder::new(AccumulatorConfig {
        min_legs: 2,
        max_legs: 4,
        min_total_odds: 3.5,
        max_total_odds: 20.0,
        ..AccumulatorConfig::default()
    })
    .unwrap();

    for seed in 0..20 {
        let outcome = builder.generate(&picks, &mut StdRng::seed_from_u64(seed));
        let Some(combo) = outcome.combination() else {
            panic!("seed {seed}: expected a parlay, got {outcome:?}");
        };
        assert!((2..=4).contains(&combo.len()));
        assert!(combo.total_odds() >= 3.5 && combo.total_odds() <= 20.0);
        let fixtures: HashSet<&str> = combo.legs().iter().map(|l| l.selection.match_id.as_str()).collect();
        assert_eq!(fixtures.len(), combo.len());
        assert!(combo.legs().iter().all(|l| l.accepted_odds <= 4.0));
        assert!(combo.legs().iter().all(|l| l.selection.home_team != "Leeds"));
    }
}

#[tokio::test]
async fn test_unreachable_floor_exhausts_attempts() {
    let picks = value_selections().await;
    let builder = AccumulatorBuilder::new(AccumulatorConfig {
        min_total_odds: 50.0,
        max_total_odds: 60.0,
        max_attempts: 25,
        ..AccumulatorConfig::default()
    })
    .unwrap();

    let outcome = builder.generate(&picks, &mut StdRng::seed_from_u64(9));
    assert_eq!(outcome, BuildOutcome::NoValidParlay { attempts: 25 });
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({"status": "no_valid_parlay", "attempts": 25})
    );
    assert_eq!(format::render_accumulator(&outcome), "No valid parlay found after 25 attempts");
}

fn curated_source() -> StaticSource {
    StaticSource::new()
        .with_league(
            "soccer_epl",
            vec![
                raw_match("EPL", "City", "Sheffield", KICKOFF, &[("bet365", 1.25, 9.0, 5.0), ("bm2", 1.30, 8.5, 5.2)]),
                raw_match("EPL", "United", "Luton", KICKOFF, &[("bet365", 1.25, 8.0, 5.0), ("bm2", 1.28, 7.5, 5.1)]),
            ],
        )
        .with_league(
            "soccer_spain_la_liga",
            vec![raw_match("La Liga", "Madrid", "Almeria", KICKOFF, &[("bm2", 1.18, 7.5, 6.0), ("bet365", 1.22, 7.0, 5.5)])],
        )
        .with_league(
            "soccer_italy_serie_a",
            vec![raw_match("Serie A", "Inter", "Lecce", KICKOFF, &[("bet365", 1.55, 5.0, 4.0), ("bm2", 1.50, 5.5, 4.2)])],
        )
}

async fn curated_candidates() -> Vec<betsage::parlay::CuratedCandidate> {
    let source = curated_source();
    let mut matches = Vec::new();
    for key in ["soccer_epl", "soccer_spain_la_liga", "soccer_italy_serie_a"] {
        matches.extend(load(&source, key).await);
    }
    CandidateScorer::new(DecoderConfig::default()).score_all(&matches)
}

#[tokio::test]
async fn test_curated_parlay_one_leg_per_league() {
    let candidates = curated_candidates().await;
    assert_eq!(candidates.len(), 4);
    assert_eq!(candidates[0].home_team, "City");
    assert!(candidates.iter().all(|c| c.bookmaker == "bet365"));

    let builder = CuratedBuilder::new(CuratedConfig {
        target_low: 1.5,
        target_high: 2.0,
        ..CuratedConfig::default()
    })
    .unwrap();
    let parlay = builder.build(&candidates);

    assert!(!parlay.fallback);
    let teams: Vec<&str> = parlay.legs.iter().map(|l| l.home_team.as_str()).collect();
    assert_eq!(teams, vec!["City", "Madrid"]);
    assert_relative_eq!(parlay.total_odds, 1.25 * 1.22, epsilon = 1e-9);
    assert_relative_eq!(parlay.confidence, 0.9, epsilon = 1e-9);
    assert_eq!(parlay.legs[1].analysis.prediction, "straight_win");

    let text = format::render_curated(&parlay);
    assert!(text.starts_with("Curated parlay: 2 legs"));
    assert!(text.contains("confidence 90%"));
    assert!(text.contains("Madrid vs Almeria [La Liga]: Straight Win @ 1.22 (90%)"));
}

#[tokio::test]
async fn test_curated_falls_back_to_top_candidates() {
    let candidates = curated_candidates().await;
    let parlay = CuratedBuilder::new(CuratedConfig::default()).unwrap().build(&candidates);

    assert!(parlay.fallback);
    assert_eq!(parlay.legs.len(), 4);
    assert_eq!(parlay.legs[0].home_team, "City");
    assert_relative_eq!(parlay.total_odds, 1.25 * 1.25 * 1.22 * 1.55, epsilon = 1e-9);
    assert!(format::render_curated(&parlay).contains("(target band not reached)"));
}
