//! Shared traits and interfaces
//!
//! Every game model is written against these two seams so that a seeded or
//! scripted generator can stand in for the production one without touching
//! payout logic.

use crate::errors::RandomSourceError;
use crate::games::types::{GameType, Outcome};

/// Source of independent uniform draws in `[0, 1)`
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`
    fn next_f64(&mut self) -> Result<f64, RandomSourceError>;

    /// Bernoulli draw that succeeds with probability `p`
    fn next_bool(&mut self, p: f64) -> Result<bool, RandomSourceError> {
        Ok(self.next_f64()? < p)
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn next_index(&mut self, len: usize) -> Result<usize, RandomSourceError> {
        let u = self.next_f64()?;
        Ok(((u * len as f64) as usize).min(len.saturating_sub(1)))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> Result<f64, RandomSourceError> {
        (**self).next_f64()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> Result<f64, RandomSourceError> {
        (**self).next_f64()
    }
}

/// A configured game that settles one round from a sequence of draws
pub trait GameModel: Send + Sync {
    /// Which game this model settles
    fn game_type(&self) -> GameType;

    /// Play a single round at `wager` and report its outcome
    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError>;
}

impl<M: GameModel + ?Sized> GameModel for &M {
    fn game_type(&self) -> GameType {
        (**self).game_type()
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        (**self).play_round(wager, rng)
    }
}

impl<M: GameModel + ?Sized> GameModel for Box<M> {
    fn game_type(&self) -> GameType {
        (**self).game_type()
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        (**self).play_round(wager, rng)
    }
}
