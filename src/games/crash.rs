//! Icicle Pop: crash point generation and cash-out settlement

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError};
use crate::games::types::{GameType, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default growth constant of the displayed multiplier, per second
pub const DEFAULT_GROWTH_RATE: f64 = 0.25;

/// Inverse-CDF crash point generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashGenerator {
    house_edge_percent: f64,
    growth_rate: f64,
}

impl CrashGenerator {
    pub fn new(house_edge_percent: f64, growth_rate: f64) -> Result<Self, ConfigurationError> {
        if !(0.0..100.0).contains(&house_edge_percent) {
            return Err(ConfigurationError::invalid(
                "crash.house_edge_percent",
                house_edge_percent,
                "must be in [0, 100)",
            ));
        }
        if !growth_rate.is_finite() || growth_rate <= 0.0 {
            return Err(ConfigurationError::invalid(
                "crash.growth_rate",
                growth_rate,
                "must be a positive number",
            ));
        }
        Ok(Self {
            house_edge_percent,
            growth_rate,
        })
    }

    pub fn house_edge_percent(&self) -> f64 {
        self.house_edge_percent
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    /// `max((100-h) / (100 - r(100-h)), 1)` for one uniform draw `r`
    pub fn crash_point_for(&self, r: f64) -> f64 {
        let retained = 100.0 - self.house_edge_percent;
        let raw = retained / (100.0 - r * retained);
        raw.max(1.0)
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<CrashRound, RandomSourceError> {
        let crash_point = self.crash_point_for(rng.next_f64()?);
        Ok(CrashRound {
            crash_point,
            growth_rate: self.growth_rate,
        })
    }

    /// Largest crash point the formula can produce, approached as `r -> 1`
    pub fn max_crash_point(&self) -> f64 {
        if self.house_edge_percent == 0.0 {
            return f64::INFINITY;
        }
        ((100.0 - self.house_edge_percent) / self.house_edge_percent).max(1.0)
    }

    /// `P(crash point > m)`, exact for the formula above
    pub fn survival(&self, m: f64) -> f64 {
        if m < 1.0 {
            return 1.0;
        }
        let retained = 100.0 - self.house_edge_percent;
        (1.0 / m - self.house_edge_percent / retained).clamp(0.0, 1.0)
    }

    /// Displayed multiplier `e^(k t)` after `seconds`
    pub fn multiplier_at(&self, seconds: f64) -> f64 {
        (self.growth_rate * seconds).exp()
    }

    /// Seconds until the displayed multiplier reaches `multiplier`
    pub fn time_to_multiplier(&self, multiplier: f64) -> f64 {
        multiplier.max(1.0).ln() / self.growth_rate
    }
}

/// One drawn round; immutable once drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashRound {
    crash_point: f64,
    growth_rate: f64,
}

impl CrashRound {
    pub fn crash_point(&self) -> f64 {
        self.crash_point
    }

    /// Instant at which the rising multiplier meets the crash point
    pub fn bust_time(&self) -> f64 {
        self.crash_point.ln() / self.growth_rate
    }

    /// Whether the round is still running at `seconds`
    pub fn is_live_at(&self, seconds: f64) -> bool {
        (self.growth_rate * seconds).exp() < self.crash_point
    }

    /// Pays `wager * at` when cashed strictly before the bust, otherwise 0
    pub fn cash_out(&self, wager: f64, at: f64) -> f64 {
        if at < self.crash_point {
            wager * at
        } else {
            0.0
        }
    }
}

/// Two decimals, for display only
pub fn display_crash_point(crash_point: f64) -> f64 {
    (crash_point * 100.0).round() / 100.0
}

/// Player behaviour used when a crash round is settled without a live player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashoutStrategy {
    /// Cash out as soon as the multiplier reaches this target
    Fixed(f64),
    /// Ride every round until it busts
    Never,
}

impl CashoutStrategy {
    pub fn fixed(target: f64) -> Result<Self, ConfigurationError> {
        let strategy = CashoutStrategy::Fixed(target);
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            CashoutStrategy::Fixed(target) if !target.is_finite() || *target <= 1.0 => Err(
                ConfigurationError::invalid("crash.cashout", target, "cash-out target must be above 1.00"),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CashoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashoutStrategy::Fixed(target) => write!(f, "cash out at {:.2}x", target),
            CashoutStrategy::Never => write!(f, "never cash out"),
        }
    }
}

/// Crash generator plus the strategy used to settle each round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashGame {
    generator: CrashGenerator,
    strategy: CashoutStrategy,
}

impl CrashGame {
    pub fn new(generator: CrashGenerator, strategy: CashoutStrategy) -> Result<Self, ConfigurationError> {
        strategy.validate()?;
        Ok(Self { generator, strategy })
    }

    pub fn generator(&self) -> &CrashGenerator {
        &self.generator
    }

    pub fn strategy(&self) -> CashoutStrategy {
        self.strategy
    }
}

impl GameModel for CrashGame {
    fn game_type(&self) -> GameType {
        GameType::Crash
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let round = self.generator.draw(rng)?;
        let crash_point = round.crash_point();

        Ok(match self.strategy {
            CashoutStrategy::Fixed(target) if target < crash_point => Outcome::CrashCashout {
                crash_point,
                cashed_out_at: target,
                payout: round.cash_out(wager, target),
            },
            _ => Outcome::CrashBust { crash_point },
        })
    }
}
