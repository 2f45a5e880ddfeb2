//! Algorithm dispatch.
//!
//! Maps an [`AlgorithmKind`] onto its scorer with the configured
//! parameters. The generator is only consumed by the Monte Carlo scorer.

use rand::Rng;
use tracing::debug;

use crate::algorithms::{
    arbitrage, comparison, threshold, trend, AlgorithmOutput, KellyCalculator, KellyConfig, MonteCarloConfig,
    ThresholdConfig,
};
use crate::algorithms::monte_carlo::Simulator;
use crate::config::AppConfig;
use crate::types::{AlgorithmKind, BetSageError, ProcessedMatch};

/// Parameters for the configurable scorers.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmSettings {
    pub kelly: KellyConfig,
    pub monte_carlo: MonteCarloConfig,
    pub threshold: ThresholdConfig,
}

impl From<&AppConfig> for AlgorithmSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            kelly: config.kelly.clone(),
            monte_carlo: config.monte_carlo.clone(),
            threshold: config.threshold.clone(),
        }
    }
}

/// Run one scorer over a batch.
///
/// Fails only on invalid settings (e.g. a non-positive bankroll); an empty
/// or fully rejected batch produces the scorer's sentinel instead.
pub fn run_algorithm<R: Rng + ?Sized>(
    kind: AlgorithmKind,
    matches: &[ProcessedMatch],
    settings: &AlgorithmSettings,
    rng: &mut R,
) -> Result<AlgorithmOutput, BetSageError> {
    debug!(algorithm = %kind, matches = matches.len(), "Dispatching");

    let output = match kind {
        AlgorithmKind::Arima => AlgorithmOutput::Trend(trend::analyze(matches)),
        AlgorithmKind::Arb => AlgorithmOutput::Arbitrage(arbitrage::detect(matches)),
        AlgorithmKind::Kelly => {
            let calc = KellyCalculator::new(settings.kelly.clone())?;
            AlgorithmOutput::Kelly(calc.size_stakes(matches))
        }
        AlgorithmKind::Monte => {
            let sim = Simulator::new(settings.monte_carlo.clone())?;
            AlgorithmOutput::MonteCarlo(sim.simulate(matches, rng))
        }
        AlgorithmKind::Ipt => AlgorithmOutput::Threshold(threshold::predict(matches, settings.threshold.threshold)),
        AlgorithmKind::Value => AlgorithmOutput::Comparison(comparison::compare(matches)),
    };
    Ok(output)
}
