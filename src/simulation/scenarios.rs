//! RTP verification scenarios
//!
//! A scenario names one configured game, a trial count and the band its RTP
//! must land in. The runner builds models through the same processor that
//! settles live rounds, so what is verified is what is played.

use crate::config::GourmetConfig;
use crate::errors::{ConfigurationError, GourmetResult};
use crate::games::plinko::{adjustment_factor, MultiplierRow};
use crate::games::processor::GameProcessor;
use crate::games::types::{GameSelection, GameType, RiskTier};
use crate::simulation::analytic::{expected_rtp, plinko_rtp};
use crate::simulation::estimator::{estimate_rtp_parallel, RtpEstimate, Verdict};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

/// One game configuration to verify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtpScenario {
    pub name: String,
    pub selection: GameSelection,
    pub trials: u64,
    pub band: (f64, f64),
}

impl RtpScenario {
    pub fn new(selection: GameSelection, trials: u64, band: (f64, f64)) -> Self {
        Self {
            name: format!("{} [{}]", selection.game_type().title(), selection),
            selection,
            trials,
            band,
        }
    }
}

/// Estimate, exact value where known, and the verdict against the band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub game_type: GameType,
    pub selection: GameSelection,
    pub estimate: RtpEstimate,
    pub analytic_rtp: Option<f64>,
    pub band: (f64, f64),
    pub verdict: Verdict,
    pub execution_time: Duration,
}

impl ScenarioResult {
    /// Whether the estimate agrees with the exact value within `z` standard errors
    pub fn agrees_with_analytic(&self, z: f64) -> Option<bool> {
        self.analytic_rtp.map(|rtp| self.estimate.consistent_with(rtp, z))
    }
}

/// Every shipped game at its configured defaults
pub fn standard_suite(config: &GourmetConfig) -> Result<Vec<RtpScenario>, ConfigurationError> {
    let trials = config.simulation.trials;
    let band = config.simulation.band();

    let mut selections = vec![
        GameSelection::Slots,
        GameSelection::Scratch,
        GameSelection::Crash {
            cashout: config.crash.default_strategy()?,
        },
    ];
    selections.extend(RiskTier::ALL.iter().map(|&risk| GameSelection::Plinko { risk }));
    selections.push(GameSelection::Mines {
        picks: config.mines.default_picks,
    });
    selections.push(GameSelection::Blackjack);

    Ok(selections
        .into_iter()
        .map(|selection| RtpScenario::new(selection, trials, band))
        .collect())
}

/// Runs scenarios against one configuration
pub struct ScenarioRunner<'a> {
    config: &'a GourmetConfig,
    processor: GameProcessor,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(config: &'a GourmetConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            config,
            processor: GameProcessor::new(config)?,
        })
    }

    pub fn run(&self, scenario: &RtpScenario) -> GourmetResult<ScenarioResult> {
        let started = Instant::now();
        let simulation = &self.config.simulation;
        let model = self.processor.model(&scenario.selection)?;

        let estimate = estimate_rtp_parallel(
            &*model,
            scenario.trials,
            simulation.wager,
            simulation.seed,
            simulation.workers,
        )?;
        let analytic_rtp = expected_rtp(self.config, &scenario.selection)?;
        let verdict = estimate.verdict(scenario.band.0, scenario.band.1);

        info!("{}: {} ({:.2}%)", scenario.name, verdict, estimate.rtp);

        Ok(ScenarioResult {
            scenario: scenario.name.clone(),
            game_type: scenario.selection.game_type(),
            selection: scenario.selection,
            estimate,
            analytic_rtp,
            band: scenario.band,
            verdict,
            execution_time: started.elapsed(),
        })
    }

    pub fn run_all(&self, scenarios: &[RtpScenario]) -> GourmetResult<Vec<ScenarioResult>> {
        scenarios.iter().map(|scenario| self.run(scenario)).collect()
    }
}

/// Rescaled multiplier row that brings one tier onto a target RTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoAdjustment {
    pub risk: RiskTier,
    pub current_rtp: f64,
    pub factor: f64,
    pub adjusted: MultiplierRow,
    pub adjusted_rtp: f64,
}

/// Multiply-all-multipliers factor for every risk tier
pub fn plinko_adjustments(
    config: &GourmetConfig,
    target_rtp: f64,
) -> Result<Vec<PlinkoAdjustment>, ConfigurationError> {
    RiskTier::ALL
        .iter()
        .map(|&risk| {
            let board = config.plinko.build(risk)?;
            let current_rtp = plinko_rtp(&board);
            let factor = adjustment_factor(target_rtp, current_rtp)?;
            let adjusted = board.multipliers().scaled(factor)?;

            let mut tuned = config.plinko.clone();
            match risk {
                RiskTier::Low => tuned.low = adjusted.values().to_vec(),
                RiskTier::Medium => tuned.medium = adjusted.values().to_vec(),
                RiskTier::High => tuned.high = adjusted.values().to_vec(),
            }
            let adjusted_rtp = plinko_rtp(&tuned.build(risk)?);

            Ok(PlinkoAdjustment {
                risk,
                current_rtp,
                factor,
                adjusted,
                adjusted_rtp,
            })
        })
        .collect()
}
