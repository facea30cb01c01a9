//! Gourmet RTP - game outcome models and RTP verification
//!
//! Models for the Gourmet Fun mini-games (Fruit Frenzy slots, Sugar Scratch,
//! Icicle Pop crash, Candy Drop plinko, Sour Apple mines and blackjack), each
//! settling a round from an injected random source, plus a Monte Carlo
//! estimator that checks the long-run return-to-player of any configured game.

pub mod common;
pub mod config;
pub mod errors;
pub mod games;
pub mod simulation;

pub use common::traits::{GameModel, RandomSource};
pub use config::GourmetConfig;
pub use errors::{GourmetError, GourmetResult};
pub use games::{GameProcessor, GameSelection, GameType, Outcome, SeededSource};
pub use simulation::{estimate_rtp, estimate_rtp_parallel, RtpEstimate, ScenarioRunner};
