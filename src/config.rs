//! Configuration management with validation and defaults
//!
//! Every section defaults to the values the games ship with. Tables are
//! validated by building the model they describe, so a config that loads is
//! a config every game can be constructed from.

use crate::errors::ConfigurationError;
use crate::games::blackjack::{BlackjackGame, BlackjackRules};
use crate::games::crash::{CashoutStrategy, CrashGame, CrashGenerator, DEFAULT_GROWTH_RATE};
use crate::games::mines::{MinesGame, MinesModel};
use crate::games::plinko::{default_multipliers, MultiplierRow, PlinkoBoard, DEFAULT_ROWS};
use crate::games::scratch::ScratchCard;
use crate::games::slots::{PayEntry, PayTable, SlotMachine};
use crate::games::types::{RiskTier, Symbol};
use crate::games::weighted::WeightedTable;
use serde::{Deserialize, Serialize};

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GourmetConfig {
    pub slots: SlotsConfig,
    pub scratch: ScratchConfig,
    pub crash: CrashConfig,
    pub plinko: PlinkoConfig,
    pub mines: MinesConfig,
    pub blackjack: BlackjackRules,
    pub simulation: SimulationConfig,
    pub monitoring: MonitoringConfig,
}

/// One reel: symbols in strip order with their weights
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReelConfig {
    pub symbols: Vec<Symbol>,
    pub weights: Vec<u32>,
}

impl ReelConfig {
    fn new(weights: [u32; 7]) -> Self {
        Self {
            symbols: Symbol::ALL.to_vec(),
            weights: weights.to_vec(),
        }
    }

    pub fn build(&self) -> Result<WeightedTable<Symbol>, ConfigurationError> {
        if self.symbols.len() != self.weights.len() {
            return Err(ConfigurationError::ValidationFailed(format!(
                "reel lists {} symbols but {} weights",
                self.symbols.len(),
                self.weights.len()
            )));
        }
        WeightedTable::build(self.symbols.iter().copied().zip(self.weights.iter().copied()))
    }
}

/// Fruit Frenzy reels and pay table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotsConfig {
    pub rows: usize,
    pub reels: Vec<ReelConfig>,
    pub paytable: Vec<PayEntry>,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        use Symbol::*;

        let pays = |symbol: Symbol, three: f64, four: f64, five: f64| {
            [(3, three), (4, four), (5, five)].map(|(matches, multiplier)| PayEntry {
                symbol,
                matches,
                multiplier,
            })
        };

        Self {
            rows: 3,
            // CHERRY, LEMON, ORANGE, GRAPE, DIAMOND, SEVEN, SCATTER
            reels: vec![
                ReelConfig::new([50, 40, 25, 15, 5, 1, 2]),
                ReelConfig::new([48, 38, 23, 14, 4, 1, 2]),
                ReelConfig::new([45, 35, 22, 12, 3, 1, 2]),
                ReelConfig::new([40, 32, 20, 10, 3, 2, 3]),
                ReelConfig::new([38, 30, 18, 10, 2, 2, 4]),
            ],
            paytable: [
                pays(Seven, 3.0, 25.0, 500.0),
                pays(Diamond, 0.8, 3.0, 20.0),
                pays(Grape, 0.6, 1.5, 8.0),
                pays(Orange, 0.5, 1.2, 5.0),
                pays(Lemon, 0.4, 0.8, 3.0),
                pays(Cherry, 0.3, 0.6, 2.0),
            ]
            .concat(),
        }
    }
}

impl SlotsConfig {
    pub fn build(&self) -> Result<SlotMachine, ConfigurationError> {
        let reels = self
            .reels
            .iter()
            .map(ReelConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        SlotMachine::new(&reels, self.rows, PayTable::build(&self.paytable)?)
    }
}

/// Sugar Scratch distribution, indexed by match count
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    pub probabilities: [f64; 5],
    pub payouts: [f64; 5],
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            probabilities: [0.50, 0.30, 0.15, 0.04, 0.01],
            payouts: [0.0, 0.5, 2.0, 5.0, 25.0],
        }
    }
}

impl ScratchConfig {
    pub fn build(&self) -> Result<ScratchCard, ConfigurationError> {
        ScratchCard::new(self.probabilities, self.payouts)
    }
}

/// Icicle Pop settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    pub house_edge_percent: f64,
    pub growth_rate: f64,
    /// Cash-out target used when simulating without an explicit one
    pub default_cashout: f64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            house_edge_percent: 10.0,
            growth_rate: DEFAULT_GROWTH_RATE,
            default_cashout: 2.0,
        }
    }
}

impl CrashConfig {
    pub fn generator(&self) -> Result<CrashGenerator, ConfigurationError> {
        CrashGenerator::new(self.house_edge_percent, self.growth_rate)
    }

    pub fn default_strategy(&self) -> Result<CashoutStrategy, ConfigurationError> {
        CashoutStrategy::fixed(self.default_cashout)
    }

    pub fn build(&self, strategy: CashoutStrategy) -> Result<CrashGame, ConfigurationError> {
        CrashGame::new(self.generator()?, strategy)
    }
}

/// Candy Drop board and the multiplier row of each risk tier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlinkoConfig {
    pub rows: u32,
    pub low: Vec<f64>,
    pub medium: Vec<f64>,
    pub high: Vec<f64>,
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            low: default_multipliers(RiskTier::Low),
            medium: default_multipliers(RiskTier::Medium),
            high: default_multipliers(RiskTier::High),
        }
    }
}

impl PlinkoConfig {
    pub fn multipliers(&self, tier: RiskTier) -> &[f64] {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::Medium => &self.medium,
            RiskTier::High => &self.high,
        }
    }

    pub fn build(&self, tier: RiskTier) -> Result<PlinkoBoard, ConfigurationError> {
        let row = MultiplierRow::new(self.multipliers(tier).to_vec()).map_err(|e| {
            ConfigurationError::ValidationFailed(format!("plinko.{}: {}", tier, e))
        })?;
        PlinkoBoard::new(self.rows, row)
    }
}

/// Sour Apple board shape and edge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinesConfig {
    pub grid_size: u32,
    pub bad_tiles: u32,
    pub house_edge_percent: f64,
    /// Safe reveals before cashing out when simulating
    pub default_picks: u32,
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            bad_tiles: 3,
            house_edge_percent: 10.0,
            default_picks: 3,
        }
    }
}

impl MinesConfig {
    pub fn model(&self) -> Result<MinesModel, ConfigurationError> {
        MinesModel::new(self.grid_size, self.bad_tiles, self.house_edge_percent)
    }

    pub fn build(&self, picks: u32) -> Result<MinesGame, ConfigurationError> {
        MinesGame::new(self.model()?, picks)
    }
}

/// Monte Carlo run settings and the RTP band being verified
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: u64,
    pub seed: u64,
    pub workers: usize,
    pub wager: f64,
    pub target_rtp: f64,
    /// Half-width of the accepted band around `target_rtp`, in percentage points
    pub tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 1_000_000,
            seed: 42,
            workers: 4,
            wager: 1.0,
            target_rtp: 90.0,
            tolerance: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Accepted RTP band `(low, high)`
    pub fn band(&self) -> (f64, f64) {
        (self.target_rtp - self.tolerance, self.target_rtp + self.tolerance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Logging for the CLI and long runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enable_logging: bool,
    pub log_level: LogLevel,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

/// Configuration validation and factory methods
impl GourmetConfig {
    /// Long runs for sign-off reports
    pub fn production() -> Self {
        Self {
            simulation: SimulationConfig {
                trials: 10_000_000,
                workers: 8,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Short runs for tuning and CI
    pub fn fast_simulation() -> Self {
        Self {
            simulation: SimulationConfig {
                trials: 100_000,
                workers: 2,
                tolerance: 2.0,
                ..Default::default()
            },
            monitoring: MonitoringConfig {
                log_level: LogLevel::Warn,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Build every configured model once and check the run settings
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.slots.build()?;
        self.scratch.build()?;
        self.crash.generator()?;
        self.crash.default_strategy()?;
        for tier in RiskTier::ALL {
            self.plinko.build(tier)?;
        }
        self.mines.build(self.mines.default_picks)?;
        BlackjackGame::new(self.blackjack)?;

        let simulation = &self.simulation;
        if simulation.trials == 0 {
            return Err(ConfigurationError::invalid("simulation.trials", 0, "must be > 0"));
        }
        if simulation.workers == 0 {
            return Err(ConfigurationError::invalid("simulation.workers", 0, "must be > 0"));
        }
        if !simulation.wager.is_finite() || simulation.wager <= 0.0 {
            return Err(ConfigurationError::invalid(
                "simulation.wager",
                simulation.wager,
                "must be a positive number",
            ));
        }
        if !simulation.tolerance.is_finite() || simulation.tolerance < 0.0 {
            return Err(ConfigurationError::invalid(
                "simulation.tolerance",
                simulation.tolerance,
                "must be a non-negative number",
            ));
        }

        Ok(())
    }
}
