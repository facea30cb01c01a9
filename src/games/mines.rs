//! Sour Apple: fair-odds multipliers and the reveal state machine

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError, RoundError};
use crate::games::combinatorics::combination;
use crate::games::types::{GameType, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_GRID_SIZE: u32 = 2;
pub const MAX_GRID_SIZE: u32 = 8;

/// Round to cents
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Multiplier table for one board shape and house edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinesModel {
    grid_size: u32,
    bad_tiles: u32,
    house_edge_percent: f64,
}

impl MinesModel {
    pub fn new(grid_size: u32, bad_tiles: u32, house_edge_percent: f64) -> Result<Self, ConfigurationError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(ConfigurationError::invalid(
                "mines.grid_size",
                grid_size,
                format!("must be between {} and {}", MIN_GRID_SIZE, MAX_GRID_SIZE),
            ));
        }
        let total = grid_size * grid_size;
        if bad_tiles == 0 || bad_tiles >= total {
            return Err(ConfigurationError::invalid(
                "mines.bad_tiles",
                bad_tiles,
                format!("must be between 1 and {}", total - 1),
            ));
        }
        if !(0.0..100.0).contains(&house_edge_percent) {
            return Err(ConfigurationError::invalid(
                "mines.house_edge_percent",
                house_edge_percent,
                "must be in [0, 100)",
            ));
        }
        Ok(Self {
            grid_size,
            bad_tiles,
            house_edge_percent,
        })
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn bad_tiles(&self) -> u32 {
        self.bad_tiles
    }

    pub fn house_edge_percent(&self) -> f64 {
        self.house_edge_percent
    }

    pub fn total_tiles(&self) -> u32 {
        self.grid_size * self.grid_size
    }

    pub fn safe_tiles(&self) -> u32 {
        self.total_tiles() - self.bad_tiles
    }

    /// `C(total, picks) / C(safe, picks)`; `None` past the last safe tile
    pub fn fair_odds(&self, picks: u32) -> Option<f64> {
        if picks > self.safe_tiles() {
            return None;
        }
        let all = combination(self.total_tiles(), picks)?;
        let safe = combination(self.safe_tiles(), picks)?;
        Some(all as f64 / safe as f64)
    }

    /// Cash-out multiplier after `picks` safe reveals, rounded to cents
    /// after the house edge is applied
    pub fn multiplier(&self, picks: u32) -> Option<f64> {
        if picks == 0 {
            return Some(1.0);
        }
        let fair = self.fair_odds(picks)?;
        Some(round2(fair * (1.0 - self.house_edge_percent / 100.0)))
    }

    /// Probability that the first `picks` reveals are all safe
    pub fn survival_probability(&self, picks: u32) -> f64 {
        self.fair_odds(picks).map(|odds| 1.0 / odds).unwrap_or(0.0)
    }

    /// Full multiplier ladder from 0 picks up to every safe tile revealed
    pub fn ladder(&self) -> Vec<f64> {
        (0..=self.safe_tiles()).filter_map(|p| self.multiplier(p)).collect()
    }
}

/// Board with its bad tiles placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinesBoard {
    bad: Vec<bool>,
}

impl MinesBoard {
    /// Place bad tiles uniformly without replacement, redrawing on collisions
    pub fn generate<R: RandomSource + ?Sized>(model: &MinesModel, rng: &mut R) -> Result<Self, RandomSourceError> {
        let tiles = model.total_tiles() as usize;
        let mut placed = BTreeSet::new();
        while placed.len() < model.bad_tiles() as usize {
            placed.insert(rng.next_index(tiles)?);
        }
        Ok(Self::from_bad_tiles(tiles, placed))
    }

    pub fn from_bad_tiles(tiles: usize, bad_tiles: impl IntoIterator<Item = usize>) -> Self {
        let mut bad = vec![false; tiles];
        for index in bad_tiles {
            if let Some(tile) = bad.get_mut(index) {
                *tile = true;
            }
        }
        Self { bad }
    }

    pub fn tiles(&self) -> usize {
        self.bad.len()
    }

    pub fn is_bad(&self, index: usize) -> bool {
        self.bad.get(index).copied().unwrap_or(false)
    }

    pub fn bad_tiles(&self) -> Vec<usize> {
        (0..self.bad.len()).filter(|&i| self.bad[i]).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    Playing,
    Busted,
    CashedOut,
}

/// Result of revealing one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reveal {
    Safe { picks: u32, multiplier: f64 },
    Bust { index: usize },
}

/// One interactive round: reveal tiles until bust or cash out
#[derive(Debug, Clone)]
pub struct MinesRound {
    model: MinesModel,
    board: MinesBoard,
    wager: f64,
    revealed: Vec<bool>,
    picks: u32,
    state: RoundState,
}

impl MinesRound {
    pub fn new(model: MinesModel, board: MinesBoard, wager: f64) -> Self {
        let revealed = vec![false; board.tiles()];
        Self {
            model,
            board,
            wager,
            revealed,
            picks: 0,
            state: RoundState::Playing,
        }
    }

    pub fn picks(&self) -> u32 {
        self.picks
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn unrevealed(&self) -> Vec<usize> {
        (0..self.revealed.len()).filter(|&i| !self.revealed[i]).collect()
    }

    pub fn current_multiplier(&self) -> f64 {
        match self.state {
            RoundState::Busted => 0.0,
            _ => self.model.multiplier(self.picks).unwrap_or(0.0),
        }
    }

    pub fn reveal(&mut self, index: usize) -> Result<Reveal, RoundError> {
        if self.state != RoundState::Playing {
            return Err(RoundError::RoundFinished);
        }
        if index >= self.revealed.len() {
            return Err(RoundError::TileOutOfRange {
                index,
                tiles: self.revealed.len(),
            });
        }
        if self.revealed[index] {
            return Err(RoundError::TileAlreadyRevealed(index));
        }

        self.revealed[index] = true;
        if self.board.is_bad(index) {
            self.state = RoundState::Busted;
            return Ok(Reveal::Bust { index });
        }

        self.picks += 1;
        Ok(Reveal::Safe {
            picks: self.picks,
            multiplier: self.current_multiplier(),
        })
    }

    /// Settle at the current multiplier and close the round
    pub fn cash_out(&mut self) -> Result<f64, RoundError> {
        if self.state != RoundState::Playing {
            return Err(RoundError::RoundFinished);
        }
        self.state = RoundState::CashedOut;
        Ok(self.wager * self.current_multiplier())
    }
}

/// Mines played with a fixed number of picks before cashing out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinesGame {
    model: MinesModel,
    picks: u32,
}

impl MinesGame {
    pub fn new(model: MinesModel, picks: u32) -> Result<Self, ConfigurationError> {
        if picks > model.safe_tiles() {
            return Err(ConfigurationError::invalid(
                "mines.picks",
                picks,
                format!("board only has {} safe tiles", model.safe_tiles()),
            ));
        }
        Ok(Self { model, picks })
    }

    pub fn model(&self) -> &MinesModel {
        &self.model
    }

    pub fn picks(&self) -> u32 {
        self.picks
    }
}

impl GameModel for MinesGame {
    fn game_type(&self) -> GameType {
        GameType::Mines
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let board = MinesBoard::generate(&self.model, rng)?;
        let mut round = MinesRound::new(self.model, board, wager);

        while round.picks() < self.picks {
            let choices = round.unrevealed();
            let index = choices[rng.next_index(choices.len())?];
            // Index comes from the unrevealed set of a live round
            if let Ok(Reveal::Bust { .. }) = round.reveal(index) {
                return Ok(Outcome::MinesReveal {
                    picks: round.picks(),
                    busted: true,
                    multiplier: 0.0,
                    payout: 0.0,
                });
            }
        }

        let multiplier = round.current_multiplier();
        let payout = round.cash_out().unwrap_or(0.0);
        Ok(Outcome::MinesReveal {
            picks: round.picks(),
            busted: false,
            multiplier,
            payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::random::{SeededSource, SequenceSource};

    fn standard() -> MinesModel {
        MinesModel::new(5, 3, 10.0).unwrap()
    }

    #[test]
    fn test_first_pick_multiplier() {
        let model = standard();
        assert_eq!(model.multiplier(0), Some(1.0));
        // (25/22) * 0.9 = 1.0227, rounded to cents
        assert_eq!(model.multiplier(1), Some(1.02));
        assert!((model.fair_odds(1).unwrap() - 25.0 / 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_strictly_increases() {
        let ladder = standard().ladder();
        assert_eq!(ladder.len(), 23);
        assert!(ladder.windows(2).all(|w| w[1] > w[0]), "{:?}", ladder);

        for bad in 2..=24 {
            let model = MinesModel::new(5, bad, 10.0).unwrap();
            let ladder = model.ladder();
            assert!(ladder[1..].windows(2).all(|w| w[1] > w[0]), "bad = {}", bad);
        }
    }

    #[test]
    fn test_single_bad_tile_first_pick_pays_below_refund() {
        let model = MinesModel::new(5, 1, 10.0).unwrap();
        // (25/24) * 0.9 = 0.9375
        assert_eq!(model.multiplier(1), Some(0.94));
        assert!(model.multiplier(0) > model.multiplier(1));
    }

    #[test]
    fn test_picks_past_safe_tiles_are_undefined() {
        let model = standard();
        assert!(model.multiplier(22).is_some());
        assert_eq!(model.multiplier(23), None);
        assert_eq!(model.survival_probability(23), 0.0);
    }

    #[test]
    fn test_largest_board_stays_exact() {
        let model = MinesModel::new(8, 1, 0.0).unwrap();
        // Surviving 63 picks on a 64-tile board with one mine is 1/64
        assert!((model.survival_probability(63) - 1.0 / 64.0).abs() < 1e-15);
        assert!(MinesModel::new(9, 3, 10.0).is_err());
        assert!(MinesModel::new(5, 25, 10.0).is_err());
        assert!(MinesModel::new(5, 0, 10.0).is_err());
    }

    #[test]
    fn test_board_generation_rejects_collisions() {
        let model = standard();
        // Second draw collides with the first and is redrawn
        let mut rng = SequenceSource::new([0.0, 0.01, 0.5, 0.99]);
        let board = MinesBoard::generate(&model, &mut rng).unwrap();
        assert_eq!(board.bad_tiles(), vec![0, 12, 24]);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_round_state_machine() {
        let model = standard();
        let board = MinesBoard::from_bad_tiles(25, [0, 1, 2]);
        let mut round = MinesRound::new(model, board, 10.0);

        assert_eq!(round.reveal(10), Ok(Reveal::Safe { picks: 1, multiplier: 1.02 }));
        assert_eq!(round.reveal(10), Err(RoundError::TileAlreadyRevealed(10)));
        assert_eq!(round.reveal(30), Err(RoundError::TileOutOfRange { index: 30, tiles: 25 }));

        let payout = round.cash_out().unwrap();
        assert!((payout - 10.2).abs() < 1e-12);
        assert_eq!(round.state(), RoundState::CashedOut);
        assert_eq!(round.reveal(11), Err(RoundError::RoundFinished));
    }

    #[test]
    fn test_bad_tile_forfeits_everything() {
        let board = MinesBoard::from_bad_tiles(25, [0, 1, 2]);
        let mut round = MinesRound::new(standard(), board, 10.0);

        round.reveal(5).unwrap();
        round.reveal(6).unwrap();
        assert_eq!(round.reveal(1), Ok(Reveal::Bust { index: 1 }));
        assert_eq!(round.current_multiplier(), 0.0);
        assert_eq!(round.cash_out(), Err(RoundError::RoundFinished));
    }

    #[test]
    fn test_game_pays_ladder_or_nothing() {
        let game = MinesGame::new(standard(), 3).unwrap();
        let mut rng = SeededSource::from_seed(9);
        for _ in 0..1_000 {
            match game.play_round(1.0, &mut rng).unwrap() {
                Outcome::MinesReveal { busted: true, payout, .. } => assert_eq!(payout, 0.0),
                Outcome::MinesReveal { busted: false, picks, payout, .. } => {
                    assert_eq!(picks, 3);
                    assert_eq!(payout, standard().multiplier(3).unwrap());
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        assert!(MinesGame::new(standard(), 23).is_err());
    }
}
