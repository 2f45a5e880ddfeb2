//! Payload → normalise → score, through the public pipeline.

use approx::assert_relative_eq;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;

use betsage::algorithms::{AlgorithmOutput, ArbitrageReport, PredictionReport, Sentinel, ValueSide};
use betsage::engine::{AlgorithmSettings, MatchBatch, Pipeline, PipelineOutput};
use betsage::format;
use betsage::odds::{JsonFileSource, OddsSource};
use betsage::selections;
use betsage::types::{AlgorithmKind, Outcome};

use crate::fixtures::{raw_match, StaticSource};

const KICKOFF: &str = "2026-11-07T15:00:00Z";

fn pipeline() -> Pipeline {
    Pipeline::new(AlgorithmSettings::default())
}

fn epl_source() -> StaticSource {
    StaticSource::new().with_league(
        "soccer_epl",
        vec![
            // Best prices 3.0 / 4.0 / 4.0 across two books: implied 0.8333.
            raw_match("EPL", "Arsenal", "Burnley", KICKOFF, &[("bm1", 3.0, 2.0, 3.5), ("bm2", 2.2, 4.0, 4.0)]),
            raw_match("EPL", "Chelsea", "Everton", KICKOFF, &[("bm1", 2.0, 2.0, 3.0), ("bm2", 1.9, 2.1, 3.0)]),
        ],
    )
}

#[tokio::test]
async fn test_arbitrage_end_to_end() {
    let source = epl_source();
    let mut rng = StdRng::seed_from_u64(11);
    let out = pipeline()
        .run(&source, "soccer_epl", AlgorithmKind::Arb, &mut rng)
        .await
        .unwrap();

    let PipelineOutput::Report(report) = &out else {
        panic!("expected a report, got {out:?}");
    };
    let AlgorithmOutput::Arbitrage(ArbitrageReport::Opportunities { opportunities }) = report else {
        panic!("expected arbitrage opportunities, got {report:?}");
    };
    assert_eq!(opportunities.len(), 1);
    let opp = &opportunities[0];
    assert_eq!(opp.home_team, "Arsenal");
    assert_eq!(opp.home_bookmakers, vec!["bm1".to_string()]);
    assert_eq!(opp.away_bookmakers, vec!["bm2".to_string()]);
    assert_relative_eq!(opp.implied_probability, 1.0 / 3.0 + 0.5, epsilon = 1e-9);
    assert_relative_eq!(opp.roi_pct, 100.0 / 6.0, epsilon = 1e-9);

    let picks = selections::from_output(report);
    assert_eq!(picks.len(), 3);
    assert!(picks.iter().all(|s| s.algorithm == AlgorithmKind::Arb));
    let draw = picks.iter().find(|s| s.outcome == Outcome::Draw).unwrap();
    assert_eq!(draw.selection, "Draw");
    assert_eq!(draw.odds, 4.0);

    let text = format::render_pipeline("EPL", &out);
    assert!(text.starts_with("== EPL ==\nArbitrage Opportunities"));
    assert!(text.contains("ROI: 16.7%"));
}

#[tokio::test]
async fn test_no_arbitrage_serializes_sentinel() {
    let source = StaticSource::new().with_league(
        "soccer_epl",
        vec![raw_match("EPL", "Chelsea", "Everton", KICKOFF, &[("bm1", 2.0, 2.0, 3.0), ("bm2", 1.9, 2.1, 3.0)])],
    );
    let out = pipeline()
        .run(&source, "soccer_epl", AlgorithmKind::Arb, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    let PipelineOutput::Report(report) = &out else {
        panic!("expected a report, got {out:?}");
    };
    assert_eq!(report.sentinel(), Some(Sentinel::NoArbitrage));
    assert!(selections::from_output(report).is_empty());
    assert_eq!(
        serde_json::to_value(report).unwrap(),
        serde_json::json!({"status": "no_arbitrage"})
    );
}

#[tokio::test]
async fn test_threshold_prediction_excludes_draw() {
    let source = StaticSource::new().with_league(
        "soccer_epl",
        vec![raw_match("EPL", "Liverpool", "Luton", KICKOFF, &[("bm1", 1.5, 6.0, 4.0), ("bm2", 1.5, 6.0, 4.2)])],
    );
    let out = pipeline()
        .run(&source, "soccer_epl", AlgorithmKind::Ipt, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    let PipelineOutput::Report(AlgorithmOutput::Threshold(PredictionReport::Predictions { predictions })) = &out else {
        panic!("expected predictions, got {out:?}");
    };
    let p = &predictions[0];
    assert_relative_eq!(p.home_prob, 0.8, epsilon = 1e-9);
    assert_relative_eq!(p.away_prob, 0.2, epsilon = 1e-9);

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["predictions"][0]["prediction"], "Home Win");
}

#[tokio::test]
async fn test_value_report_from_fixture_file() {
    let payload = serde_json::json!([
        raw_match("La Liga", "Sevilla", "Getafe", KICKOFF, &[("bm1", 1.8, 4.5, 3.6), ("bm2", 1.9, 4.2, 3.5)]),
        // One bookmaker only: dropped by the normaliser.
        raw_match("La Liga", "Girona", "Cadiz", KICKOFF, &[("bm1", 1.7, 5.0, 3.8)]),
    ]);
    let path = std::env::temp_dir().join(format!("betsage-fixture-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&payload).unwrap()).unwrap();

    let source = JsonFileSource::new(&path);
    let batch = pipeline().fetch(&source, "file").await.unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(batch.matches().len(), 1);
    let out = pipeline()
        .analyze(&batch, AlgorithmKind::Value, &mut StdRng::seed_from_u64(0))
        .unwrap();
    let PipelineOutput::Report(AlgorithmOutput::Comparison(report)) = &out else {
        panic!("expected a comparison report, got {out:?}");
    };
    let bet = &report.value_bets[0];
    assert_eq!(bet.best_home_odds, 1.9);
    assert_eq!(bet.home_bookmaker.as_deref(), Some("bm2"));
    assert_eq!(bet.best_away_odds, 4.5);
    assert_eq!(bet.value_rating, ValueSide::Away);
}

#[tokio::test]
async fn test_missing_fixture_file_is_an_error() {
    let source = JsonFileSource::new("/no/such/betsage-odds.json");
    assert!(pipeline().fetch(&source, "file").await.is_err());
}

#[tokio::test]
async fn test_leagues_fetched_concurrently() {
    let source = epl_source().with_league("soccer_spain_la_liga", vec![]);
    let pipeline = pipeline();
    let keys = ["soccer_epl", "soccer_spain_la_liga", "soccer_italy_serie_a"];

    let results = join_all(keys.iter().map(|key| pipeline.fetch(&source, key))).await;

    assert_eq!(results[0].as_ref().unwrap().matches().len(), 2);
    assert_eq!(results[1].as_ref().unwrap(), &MatchBatch::NoData);
    assert!(results[2].is_err());
    assert_eq!(source.name(), "static");
}

#[test]
fn test_every_algorithm_runs_on_one_batch() {
    let source = epl_source();
    let pipeline = pipeline();
    let batch = tokio_test::block_on(pipeline.fetch(&source, "soccer_epl")).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    for kind in AlgorithmKind::ALL {
        let out = pipeline.analyze(&batch, *kind, &mut rng).unwrap();
        let PipelineOutput::Report(report) = &out else {
            panic!("{kind}: expected a report, got {out:?}");
        };
        let rendered = format::render_output(report);
        assert!(!rendered.is_empty(), "{kind} rendered nothing");
        for s in selections::from_output(report) {
            assert_eq!(s.algorithm, *kind);
            assert!(s.odds > 1.0, "{kind} produced odds {}", s.odds);
        }
    }
}
