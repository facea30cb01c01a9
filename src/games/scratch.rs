//! Sugar Scratch: match-count draw and the cosmetic number layout

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError};
use crate::games::random::shuffle;
use crate::games::types::{GameType, Outcome};
use serde::{Deserialize, Serialize};

/// Highest possible match count; one per winning number
pub const MAX_MATCHES: usize = 4;
pub const PLAYER_NUMBERS: usize = 12;
pub const NUMBER_POOL: u8 = 50;

const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

/// Probability and payout per match count, indexed 0..=4
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchCard {
    probabilities: [f64; MAX_MATCHES + 1],
    payouts: [f64; MAX_MATCHES + 1],
}

impl ScratchCard {
    pub fn new(
        probabilities: [f64; MAX_MATCHES + 1],
        payouts: [f64; MAX_MATCHES + 1],
    ) -> Result<Self, ConfigurationError> {
        if let Some(p) = probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ConfigurationError::invalid(
                "scratch.probabilities",
                p,
                "probabilities must lie in [0, 1]",
            ));
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(ConfigurationError::ValidationFailed(format!(
                "scratch probabilities sum to {}, expected 1",
                total
            )));
        }
        if let Some(m) = payouts.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(ConfigurationError::invalid(
                "scratch.payouts",
                m,
                "payouts must be non-negative numbers",
            ));
        }
        if payouts[0] != 0.0 {
            return Err(ConfigurationError::invalid(
                "scratch.payouts[0]",
                payouts[0],
                "a card with no matches must pay nothing",
            ));
        }
        Ok(Self {
            probabilities,
            payouts,
        })
    }

    pub fn probabilities(&self) -> &[f64; MAX_MATCHES + 1] {
        &self.probabilities
    }

    pub fn payouts(&self) -> &[f64; MAX_MATCHES + 1] {
        &self.payouts
    }

    /// Walk cumulative probabilities from four matches down to none
    pub fn match_count_at(&self, u: f64) -> u8 {
        let mut cumulative = 0.0;
        for matches in (0..=MAX_MATCHES).rev() {
            cumulative += self.probabilities[matches];
            if u < cumulative {
                return matches as u8;
            }
        }
        0
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<u8, RandomSourceError> {
        Ok(self.match_count_at(rng.next_f64()?))
    }

    pub fn multiplier(&self, matches: u8) -> f64 {
        self.payouts.get(matches as usize).copied().unwrap_or(0.0)
    }

    pub fn payout(&self, matches: u8, wager: f64) -> f64 {
        wager * self.multiplier(matches)
    }

    /// `sum(p[m] * payout[m])`, as a fraction of the wager
    pub fn expected_return(&self) -> f64 {
        self.probabilities
            .iter()
            .zip(&self.payouts)
            .map(|(p, m)| p * m)
            .sum()
    }

    /// Numbers shown for an already-drawn match count
    ///
    /// Losing numbers are sometimes nudged next to a winning number so the
    /// card looks close. None of this touches the payout.
    pub fn layout<R: RandomSource + ?Sized>(&self, matches: u8, rng: &mut R) -> Result<ScratchLayout, RandomSourceError> {
        let matches = (matches as usize).min(MAX_MATCHES);
        let mut pool: Vec<u8> = (1..=NUMBER_POOL).collect();
        shuffle(&mut pool, rng)?;

        let winning: Vec<u8> = pool[..MAX_MATCHES].to_vec();
        let mut player: Vec<u8> = winning[..matches].to_vec();
        player.extend_from_slice(&pool[MAX_MATCHES..MAX_MATCHES + PLAYER_NUMBERS - matches]);

        for index in 0..player.len() {
            if winning.contains(&player[index]) || !rng.next_bool(0.5)? {
                continue;
            }
            let anchor = winning[rng.next_index(winning.len())?];
            let mut nudged = if rng.next_bool(0.5)? { anchor + 1 } else { anchor - 1 };
            if nudged < 1 {
                nudged = anchor + 1;
            }
            if nudged > NUMBER_POOL {
                nudged = anchor - 1;
            }
            if !winning.contains(&nudged) && !player.contains(&nudged) {
                player[index] = nudged;
            }
        }

        shuffle(&mut player, rng)?;
        Ok(ScratchLayout { winning, player })
    }
}

/// Winning numbers and the player's twelve numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchLayout {
    pub winning: Vec<u8>,
    pub player: Vec<u8>,
}

impl ScratchLayout {
    pub fn matches(&self) -> u8 {
        self.player.iter().filter(|n| self.winning.contains(n)).count() as u8
    }
}

impl GameModel for ScratchCard {
    fn game_type(&self) -> GameType {
        GameType::Scratch
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let matches = self.draw(rng)?;
        Ok(Outcome::ScratchMatch {
            matches,
            multiplier: self.multiplier(matches),
            payout: self.payout(matches, wager),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::random::{SeededSource, SequenceSource};

    fn card() -> ScratchCard {
        ScratchCard::new([0.50, 0.30, 0.15, 0.04, 0.01], [0.0, 0.5, 2.0, 5.0, 25.0]).unwrap()
    }

    #[test]
    fn test_expected_return_is_ninety_percent() {
        assert!((card().expected_return() - 0.90).abs() < 1e-12);
    }

    #[test]
    fn test_draw_walks_from_four_matches_down() {
        let card = card();
        assert_eq!(card.match_count_at(0.0), 4);
        assert_eq!(card.match_count_at(0.009), 4);
        assert_eq!(card.match_count_at(0.011), 3);
        assert_eq!(card.match_count_at(0.049), 3);
        assert_eq!(card.match_count_at(0.051), 2);
        assert_eq!(card.match_count_at(0.25), 1);
        assert_eq!(card.match_count_at(0.6), 0);
        assert_eq!(card.match_count_at(0.999_999), 0);
    }

    #[test]
    fn test_distribution_must_sum_to_one() {
        assert!(ScratchCard::new([0.5, 0.3, 0.15, 0.04, 0.02], [0.0, 0.5, 2.0, 5.0, 25.0]).is_err());
        assert!(ScratchCard::new([1.5, -0.3, -0.15, -0.04, -0.01], [0.0, 0.5, 2.0, 5.0, 25.0]).is_err());
        assert!(ScratchCard::new([0.5, 0.3, 0.15, 0.04, 0.01], [1.0, 0.5, 2.0, 5.0, 25.0]).is_err());
    }

    #[test]
    fn test_round_pays_from_match_count() {
        let outcome = card().play_round(4.0, &mut SequenceSource::new([0.03])).unwrap();
        assert_eq!(outcome, Outcome::ScratchMatch { matches: 3, multiplier: 5.0, payout: 20.0 });
    }

    #[test]
    fn test_layout_agrees_with_drawn_matches() {
        let card = card();
        let mut rng = SeededSource::from_seed(17);
        for matches in 0..=4u8 {
            for _ in 0..50 {
                let layout = card.layout(matches, &mut rng).unwrap();
                assert_eq!(layout.winning.len(), 4);
                assert_eq!(layout.player.len(), 12);
                assert_eq!(layout.matches(), matches);

                let mut distinct = layout.player.clone();
                distinct.sort_unstable();
                distinct.dedup();
                assert_eq!(distinct.len(), 12);
                assert!(layout.player.iter().all(|n| (1..=50).contains(n)));
            }
        }
    }
}
