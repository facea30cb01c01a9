//! Monte Carlo RTP estimation
//!
//! Trials are independent, so partial results from any number of workers
//! combine by plain summation of count, payout and squared payout.

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, GourmetResult, RandomSourceError, SimulationError, WagerError};
use crate::games::random::SeededSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Two-sided 95% normal quantile
pub const Z_95: f64 = 1.959_963_985;

/// Running sums for one batch of rounds at a fixed wager
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RtpAccumulator {
    pub trials: u64,
    pub total_payout: f64,
    pub total_payout_squared: f64,
    pub hits: u64,
    pub max_payout: f64,
}

impl RtpAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, payout: f64) {
        self.trials += 1;
        self.total_payout += payout;
        self.total_payout_squared += payout * payout;
        if payout > 0.0 {
            self.hits += 1;
        }
        if payout > self.max_payout {
            self.max_payout = payout;
        }
    }

    pub fn merge(&mut self, other: &RtpAccumulator) {
        self.trials += other.trials;
        self.total_payout += other.total_payout;
        self.total_payout_squared += other.total_payout_squared;
        self.hits += other.hits;
        self.max_payout = self.max_payout.max(other.max_payout);
    }

    /// Summary statistics at `wager` per round
    pub fn finish(&self, wager: f64) -> RtpEstimate {
        let n = self.trials as f64;
        let (avg_payout, stddev) = if self.trials == 0 {
            (0.0, 0.0)
        } else {
            let mean = self.total_payout / n;
            let variance = if self.trials > 1 {
                ((self.total_payout_squared - n * mean * mean) / (n - 1.0)).max(0.0)
            } else {
                0.0
            };
            (mean, variance.sqrt())
        };

        let stderr = if self.trials == 0 { 0.0 } else { stddev / n.sqrt() };

        RtpEstimate {
            trials: self.trials,
            wager,
            total_wagered: wager * n,
            total_payout: self.total_payout,
            avg_payout,
            rtp: avg_payout / wager * 100.0,
            stddev,
            stderr,
            stderr_pct: stderr / wager * 100.0,
            hit_rate: if self.trials == 0 { 0.0 } else { self.hits as f64 / n },
            max_payout: self.max_payout,
        }
    }
}

/// Where an estimate sits relative to an accepted RTP band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The whole confidence interval lies inside the band
    Within,
    /// The confidence interval misses the band entirely
    Outside,
    /// The interval straddles a band edge; more trials needed
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Within => write!(f, "GOOD"),
            Verdict::Outside => write!(f, "NEEDS ADJUSTMENT"),
            Verdict::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// Empirical RTP with its sampling error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtpEstimate {
    pub trials: u64,
    pub wager: f64,
    pub total_wagered: f64,
    pub total_payout: f64,
    pub avg_payout: f64,
    /// Percent of the amount wagered paid back
    pub rtp: f64,
    /// Standard deviation of a single round's payout
    pub stddev: f64,
    /// Standard error of `avg_payout`, in payout units
    pub stderr: f64,
    /// Standard error of `rtp`, in percentage points
    pub stderr_pct: f64,
    pub hit_rate: f64,
    pub max_payout: f64,
}

impl RtpEstimate {
    /// `rtp ± z * stderr_pct`
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (self.rtp - z * self.stderr_pct, self.rtp + z * self.stderr_pct)
    }

    pub fn ci95(&self) -> (f64, f64) {
        self.confidence_interval(Z_95)
    }

    /// Whether the band `[low, high]` cannot be ruled out at 95%
    pub fn within(&self, low: f64, high: f64) -> bool {
        let (ci_low, ci_high) = self.ci95();
        ci_low <= high && ci_high >= low
    }

    /// Whether `target` lies within `z` standard errors of the estimate
    pub fn consistent_with(&self, target: f64, z: f64) -> bool {
        (self.rtp - target).abs() <= z * self.stderr_pct
    }

    pub fn verdict(&self, low: f64, high: f64) -> Verdict {
        let (ci_low, ci_high) = self.ci95();
        if ci_low >= low && ci_high <= high {
            Verdict::Within
        } else if ci_high < low || ci_low > high {
            Verdict::Outside
        } else {
            Verdict::Inconclusive
        }
    }

    pub fn house_edge(&self) -> f64 {
        100.0 - self.rtp
    }
}

fn check_run(trials: u64, wager: f64) -> GourmetResult<()> {
    if trials == 0 {
        return Err(ConfigurationError::invalid("trials", 0, "must be > 0").into());
    }
    if !wager.is_finite() || wager <= 0.0 {
        return Err(WagerError::NonPositive(wager).into());
    }
    Ok(())
}

/// Play `trials` rounds into an accumulator
pub fn run_trials<M, R>(
    model: &M,
    trials: u64,
    wager: f64,
    rng: &mut R,
) -> Result<RtpAccumulator, RandomSourceError>
where
    M: GameModel + ?Sized,
    R: RandomSource,
{
    let mut accumulator = RtpAccumulator::new();
    for _ in 0..trials {
        let outcome = model.play_round(wager, rng)?;
        accumulator.record(outcome.payout());
    }
    Ok(accumulator)
}

/// Estimate RTP on the calling thread
pub fn estimate_rtp<M, R>(model: &M, trials: u64, wager: f64, rng: &mut R) -> GourmetResult<RtpEstimate>
where
    M: GameModel + ?Sized,
    R: RandomSource,
{
    check_run(trials, wager)?;
    let started = Instant::now();

    let estimate = run_trials(model, trials, wager, rng)?.finish(wager);

    info!(
        "{}: {} trials, RTP {:.3}% ± {:.3} in {:?}",
        model.game_type(),
        trials,
        estimate.rtp,
        estimate.stderr_pct,
        started.elapsed()
    );
    Ok(estimate)
}

/// Estimate RTP across `workers` threads, each on its own stream of `seed`
///
/// The result depends only on `(seed, workers, trials)`.
pub fn estimate_rtp_parallel<M>(
    model: &M,
    trials: u64,
    wager: f64,
    seed: u64,
    workers: usize,
) -> GourmetResult<RtpEstimate>
where
    M: GameModel + ?Sized,
{
    check_run(trials, wager)?;
    if workers == 0 {
        return Err(ConfigurationError::invalid("workers", 0, "must be > 0").into());
    }

    let workers = (workers as u64).min(trials);
    let share = trials / workers;
    let remainder = trials % workers;
    let started = Instant::now();

    let partials = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let count = share + u64::from(worker < remainder);
                scope.spawn(move |_| {
                    let mut rng = SeededSource::for_stream(seed, worker);
                    let partial = run_trials(model, count, wager, &mut rng);
                    debug!("worker {} finished {} trials", worker, count);
                    partial
                })
            })
            .collect();

        handles.into_iter().map(|handle| handle.join()).collect::<Vec<_>>()
    })
    .map_err(|_| SimulationError::WorkerPanicked)?;

    let mut total = RtpAccumulator::new();
    for partial in partials {
        let partial = partial.map_err(|_| SimulationError::WorkerPanicked)??;
        total.merge(&partial);
    }

    let estimate = total.finish(wager);
    info!(
        "{}: {} trials on {} workers, RTP {:.3}% ± {:.3} in {:?}",
        model.game_type(),
        trials,
        workers,
        estimate.rtp,
        estimate.stderr_pct,
        started.elapsed()
    );
    Ok(estimate)
}
