//! Candy Drop: binomial peg walk and bucket payouts

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError};
use crate::games::combinatorics::binomial_pmf;
use crate::games::types::{GameType, Outcome, RiskTier};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ROWS: u32 = 13;

/// Horizontal spread between neighbouring balls of a batch drop
pub const BATCH_SPREAD: f64 = 0.6;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Stock multiplier rows for a 13-row board
pub fn default_multipliers(tier: RiskTier) -> Vec<f64> {
    match tier {
        RiskTier::Low => vec![5.5, 3.0, 2.0, 1.2, 0.9, 0.6, 0.5, 0.5, 0.6, 0.9, 1.2, 2.0, 3.0, 5.5],
        RiskTier::Medium => vec![22.0, 9.0, 4.0, 2.0, 0.8, 0.4, 0.3, 0.3, 0.4, 0.8, 2.0, 4.0, 9.0, 22.0],
        RiskTier::High => vec![130.0, 35.0, 10.0, 1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.5, 10.0, 35.0, 130.0],
    }
}

/// Symmetric, non-negative multipliers, one per bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MultiplierRow {
    values: Vec<f64>,
}

impl MultiplierRow {
    pub fn new(values: Vec<f64>) -> Result<Self, ConfigurationError> {
        if values.len() < 2 {
            return Err(ConfigurationError::ValidationFailed(
                "multiplier row needs at least two buckets".to_string(),
            ));
        }
        if let Some(bad) = values.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(ConfigurationError::invalid(
                "plinko.multipliers",
                bad,
                "multipliers must be non-negative numbers",
            ));
        }
        let last = values.len() - 1;
        if let Some(i) = (0..values.len()).find(|&i| (values[i] - values[last - i]).abs() > SYMMETRY_TOLERANCE) {
            return Err(ConfigurationError::ValidationFailed(format!(
                "multiplier row is not symmetric: bucket {} = {} but bucket {} = {}",
                i,
                values[i],
                last - i,
                values[last - i]
            )));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, bucket: usize) -> Option<f64> {
        self.values.get(bucket).copied()
    }

    /// Every multiplier times `factor`
    pub fn scaled(&self, factor: f64) -> Result<Self, ConfigurationError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigurationError::invalid("factor", factor, "must be a positive number"));
        }
        Self::new(self.values.iter().map(|m| m * factor).collect())
    }
}

impl TryFrom<Vec<f64>> for MultiplierRow {
    type Error = ConfigurationError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<MultiplierRow> for Vec<f64> {
    fn from(row: MultiplierRow) -> Self {
        row.values
    }
}

/// Ball position after `row` pegs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub row: u32,
    pub column: f64,
}

/// Full trajectory of one ball, for animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoPath {
    pub positions: Vec<PathPoint>,
    pub bucket: usize,
}

/// Board geometry and the multiplier row of one risk tier
#[derive(Debug, Clone, PartialEq)]
pub struct PlinkoBoard {
    rows: u32,
    start_column: f64,
    multipliers: MultiplierRow,
}

impl PlinkoBoard {
    /// Board whose ball starts at the centre column `rows / 2`
    pub fn new(rows: u32, multipliers: MultiplierRow) -> Result<Self, ConfigurationError> {
        Self::with_start_column(rows, rows as f64 / 2.0, multipliers)
    }

    pub fn with_start_column(
        rows: u32,
        start_column: f64,
        multipliers: MultiplierRow,
    ) -> Result<Self, ConfigurationError> {
        if rows == 0 {
            return Err(ConfigurationError::invalid("plinko.rows", rows, "must be > 0"));
        }
        if multipliers.len() != rows as usize + 1 {
            return Err(ConfigurationError::ValidationFailed(format!(
                "{} rows need {} multipliers, got {}",
                rows,
                rows + 1,
                multipliers.len()
            )));
        }
        if !start_column.is_finite() {
            return Err(ConfigurationError::invalid(
                "plinko.start_column",
                start_column,
                "must be finite",
            ));
        }
        Ok(Self {
            rows,
            start_column,
            multipliers,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn start_column(&self) -> f64 {
        self.start_column
    }

    pub fn multipliers(&self) -> &MultiplierRow {
        &self.multipliers
    }

    /// `clamp(floor(column), 0, rows)`
    pub fn bucket_for_column(&self, column: f64) -> usize {
        column.floor().clamp(0.0, self.rows as f64) as usize
    }

    pub fn multiplier(&self, bucket: usize) -> f64 {
        self.multipliers.get(bucket).unwrap_or(0.0)
    }

    /// Payout-determining walk; builds no path
    pub fn drop_bucket<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<usize, RandomSourceError> {
        self.walk_from(self.start_column, rng, |_, _| {})
    }

    /// Same walk as [`PlinkoBoard::drop_bucket`], recording every position
    pub fn drop_path<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<PlinkoPath, RandomSourceError> {
        self.path_from(self.start_column, rng)
    }

    /// `balls` independent drops spread around the centre
    pub fn drop_batch<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        balls: usize,
    ) -> Result<Vec<PlinkoPath>, RandomSourceError> {
        let centre = (balls as f64 - 1.0) / 2.0;
        let paths = (0..balls)
            .map(|i| {
                let start = self.rows as f64 / 2.0 + (i as f64 - centre) * BATCH_SPREAD;
                self.path_from(start, &mut *rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("dropped batch of {} balls", balls);
        Ok(paths)
    }

    /// Exact probability of each bucket for a ball released at the start column
    pub fn bucket_distribution(&self) -> Vec<f64> {
        let mut distribution = vec![0.0; self.rows as usize + 1];
        for right_steps in 0..=self.rows {
            let column = self.start_column + 0.5 * (2.0 * right_steps as f64 - self.rows as f64);
            distribution[self.bucket_for_column(column)] += binomial_pmf(self.rows, right_steps, 0.5);
        }
        distribution
    }

    fn path_from<R: RandomSource + ?Sized>(&self, start: f64, rng: &mut R) -> Result<PlinkoPath, RandomSourceError> {
        let mut positions = Vec::with_capacity(self.rows as usize + 1);
        positions.push(PathPoint { row: 0, column: start });
        let bucket = self.walk_from(start, rng, |row, column| positions.push(PathPoint { row, column }))?;
        Ok(PlinkoPath { positions, bucket })
    }

    fn walk_from<R: RandomSource + ?Sized>(
        &self,
        start: f64,
        rng: &mut R,
        mut visit: impl FnMut(u32, f64),
    ) -> Result<usize, RandomSourceError> {
        let mut column = start;
        for row in 1..=self.rows {
            column += if rng.next_bool(0.5)? { -0.5 } else { 0.5 };
            visit(row, column);
        }
        Ok(self.bucket_for_column(column))
    }
}

impl GameModel for PlinkoBoard {
    fn game_type(&self) -> GameType {
        GameType::Plinko
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let bucket = self.drop_bucket(rng)?;
        let multiplier = self.multiplier(bucket);
        Ok(Outcome::PlinkoBucket {
            bucket,
            multiplier,
            payout: wager * multiplier,
        })
    }
}

/// Factor that moves a measured RTP onto `target` when applied to every multiplier
pub fn adjustment_factor(target_rtp: f64, measured_rtp: f64) -> Result<f64, ConfigurationError> {
    if !measured_rtp.is_finite() || measured_rtp <= 0.0 {
        return Err(ConfigurationError::invalid(
            "measured_rtp",
            measured_rtp,
            "cannot rescale a row that never pays",
        ));
    }
    Ok(target_rtp / measured_rtp)
}
