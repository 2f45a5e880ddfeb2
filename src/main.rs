//! BetSage: head-to-head odds analysis and parlay construction
//!
//! Entry point. Loads configuration, initialises structured logging,
//! fetches the requested leagues concurrently and prints the chosen
//! algorithm's report or a built parlay.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{error, info};

use betsage::config::AppConfig;
use betsage::engine::{AlgorithmSettings, MatchBatch, Pipeline, PipelineOutput};
use betsage::format;
use betsage::odds::the_odds_api::TheOddsApiClient;
use betsage::odds::{JsonFileSource, OddsSource};
use betsage::parlay::{AccumulatorBuilder, CandidateScorer, CuratedBuilder};
use betsage::selections;
use betsage::types::{AlgorithmKind, ProcessedMatch};

#[derive(Parser)]
#[command(name = "betsage")]
#[command(author, version, about = "Head-to-head odds analysis and parlay builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Moving-average trend analysis
    #[command(alias = "trend")]
    Arima(SourceArgs),
    /// Cross-bookmaker arbitrage detection
    #[command(alias = "arbitrage")]
    Arb(SourceArgs),
    /// Fractional-Kelly stake sizing (needs model probabilities in the feed)
    Kelly(SourceArgs),
    /// Monte Carlo outcome simulation
    #[command(alias = "montecarlo")]
    Monte(SourceArgs),
    /// Implied-probability threshold prediction
    #[command(alias = "threshold")]
    Ipt(SourceArgs),
    /// Best-price odds comparison
    #[command(alias = "ocm")]
    Value(SourceArgs),
    /// Run an algorithm and build a random accumulator from its picks
    Accumulator {
        /// Algorithm whose selections feed the accumulator
        #[arg(short, long, default_value = "value")]
        algorithm: String,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Score fixtures with the odds-rule decoder and build a curated parlay
    Curated(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// League display name or API sport key (repeatable)
    #[arg(short, long)]
    league: Vec<String>,

    /// Read raw matches from a JSON file instead of the odds API
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Seed for the random generator
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load_or_default(&cli.config.to_string_lossy())?;

    match cli.command {
        Commands::Arima(args) => run_report(&cfg, AlgorithmKind::Arima, &args).await,
        Commands::Arb(args) => run_report(&cfg, AlgorithmKind::Arb, &args).await,
        Commands::Kelly(args) => run_report(&cfg, AlgorithmKind::Kelly, &args).await,
        Commands::Monte(args) => run_report(&cfg, AlgorithmKind::Monte, &args).await,
        Commands::Ipt(args) => run_report(&cfg, AlgorithmKind::Ipt, &args).await,
        Commands::Value(args) => run_report(&cfg, AlgorithmKind::Value, &args).await,
        Commands::Accumulator { algorithm, source } => {
            let kind: AlgorithmKind = algorithm.parse()?;
            run_accumulator(&cfg, kind, &source).await
        }
        Commands::Curated(args) => run_curated(&cfg, &args).await,
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One algorithm report per league.
async fn run_report(cfg: &AppConfig, kind: AlgorithmKind, args: &SourceArgs) -> Result<()> {
    let pipeline = Pipeline::new(AlgorithmSettings::from(cfg));
    let batches = fetch_all(cfg, &pipeline, args).await?;
    let mut rng = make_rng(cfg, args);

    let mut reports = Vec::with_capacity(batches.len());
    for (league, batch) in &batches {
        let output = pipeline.analyze(batch, kind, &mut rng)?;
        reports.push((league.as_str(), output));
    }

    if args.json {
        let json: Vec<serde_json::Value> = reports
            .iter()
            .map(|(league, output)| serde_json::json!({ "league": league, "result": output }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for (league, output) in &reports {
            println!("{}\n", format::render_pipeline(league, output));
        }
    }

    let found = reports
        .iter()
        .filter(|(_, o)| matches!(o, PipelineOutput::Report(r) if !r.is_empty()))
        .count();
    info!(algorithm = %kind, leagues = reports.len(), with_results = found, "Run complete");
    Ok(())
}

async fn run_accumulator(cfg: &AppConfig, kind: AlgorithmKind, args: &SourceArgs) -> Result<()> {
    let pipeline = Pipeline::new(AlgorithmSettings::from(cfg));
    let builder = AccumulatorBuilder::new(cfg.accumulator.clone())?;
    let batches = fetch_all(cfg, &pipeline, args).await?;
    let mut rng = make_rng(cfg, args);

    let mut pool = Vec::new();
    for (_, batch) in &batches {
        if let PipelineOutput::Report(report) = pipeline.analyze(batch, kind, &mut rng)? {
            pool.extend(selections::from_output(&report));
        }
    }
    info!(algorithm = %kind, selections = pool.len(), "Selections collected");

    let outcome = builder.generate(&pool, &mut rng);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", format::render_accumulator(&outcome));
    }
    Ok(())
}

async fn run_curated(cfg: &AppConfig, args: &SourceArgs) -> Result<()> {
    let pipeline = Pipeline::new(AlgorithmSettings::from(cfg));
    let scorer = CandidateScorer::new(cfg.decoder.clone());
    let builder = CuratedBuilder::new(cfg.curated.clone())?;
    let batches = fetch_all(cfg, &pipeline, args).await?;

    let matches: Vec<ProcessedMatch> = batches
        .iter()
        .flat_map(|(_, batch)| batch.matches().iter().cloned())
        .collect();
    let candidates = scorer.score_all(&matches);
    info!(matches = matches.len(), candidates = candidates.len(), "Candidates scored");

    let parlay = builder.build(&candidates);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&parlay)?);
    } else {
        println!("{}", format::render_curated(&parlay));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the odds source: a fixture file when `--input` is given, the odds
/// API otherwise.
fn make_source(cfg: &AppConfig, args: &SourceArgs) -> Result<Box<dyn OddsSource>> {
    match &args.input {
        Some(path) => Ok(Box::new(JsonFileSource::new(path.clone()))),
        None => {
            let api_key = AppConfig::resolve_env(&cfg.odds_api.api_key_env)?;
            Ok(Box::new(TheOddsApiClient::new(api_key, &cfg.odds_api)?))
        }
    }
}

/// Resolve league names and fetch every league concurrently. A league that
/// fails to fetch is logged and left out.
async fn fetch_all(cfg: &AppConfig, pipeline: &Pipeline, args: &SourceArgs) -> Result<Vec<(String, MatchBatch)>> {
    let keys: Vec<String> = if args.input.is_some() {
        if args.league.is_empty() {
            vec!["file".to_string()]
        } else {
            args.league.clone()
        }
    } else {
        if args.league.is_empty() {
            bail!("At least one --league is required when no --input file is given");
        }
        let directory = cfg.league_directory();
        args.league
            .iter()
            .map(|name| directory.resolve(name))
            .collect::<Result<_, _>>()?
    };

    let source = make_source(cfg, args)?;
    info!(source = source.name(), leagues = keys.len(), "Fetching leagues");

    let results = join_all(keys.iter().map(|key| pipeline.fetch(&*source, key))).await;

    let mut batches = Vec::with_capacity(keys.len());
    for (key, result) in keys.into_iter().zip(results) {
        match result {
            Ok(batch) => batches.push((key, batch)),
            Err(e) => error!(league = %key, error = %e, "Fetch failed"),
        }
    }
    Ok(batches)
}

fn make_rng(cfg: &AppConfig, args: &SourceArgs) -> StdRng {
    match args.seed.or(cfg.monte_carlo.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Initialise the `tracing` subscriber. Logs go to stderr so reports on
/// stdout stay clean.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betsage=info"));

    let json_logging = std::env::var("BETSAGE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
