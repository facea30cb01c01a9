//! Exact expected RTP where the distribution is small enough to sum
//!
//! Slots and blackjack have no closed form here and are left to the
//! estimator.

use crate::config::GourmetConfig;
use crate::errors::ConfigurationError;
use crate::games::crash::{CashoutStrategy, CrashGenerator};
use crate::games::mines::MinesModel;
use crate::games::plinko::PlinkoBoard;
use crate::games::scratch::ScratchCard;
use crate::games::types::GameSelection;

/// `sum(p[m] * payout[m])` in percent
pub fn scratch_rtp(card: &ScratchCard) -> f64 {
    card.expected_return() * 100.0
}

/// Binomial bucket probabilities weighted by the multiplier row, in percent
pub fn plinko_rtp(board: &PlinkoBoard) -> f64 {
    board
        .bucket_distribution()
        .iter()
        .zip(board.multipliers().values())
        .map(|(p, m)| p * m)
        .sum::<f64>()
        * 100.0
}

/// `c * P(crash > c)` in percent; riding every round to the bust returns nothing
pub fn crash_rtp(generator: &CrashGenerator, strategy: CashoutStrategy) -> f64 {
    match strategy {
        CashoutStrategy::Fixed(target) => target * generator.survival(target) * 100.0,
        CashoutStrategy::Never => 0.0,
    }
}

/// Survive `picks` reveals, then cash out at the rounded multiplier
pub fn mines_rtp(model: &MinesModel, picks: u32) -> f64 {
    model.survival_probability(picks) * model.multiplier(picks).unwrap_or(0.0) * 100.0
}

/// Exact RTP for a configured selection, when one exists
pub fn expected_rtp(config: &GourmetConfig, selection: &GameSelection) -> Result<Option<f64>, ConfigurationError> {
    Ok(match *selection {
        GameSelection::Scratch => Some(scratch_rtp(&config.scratch.build()?)),
        GameSelection::Plinko { risk } => Some(plinko_rtp(&config.plinko.build(risk)?)),
        GameSelection::Crash { cashout } => Some(crash_rtp(&config.crash.generator()?, cashout)),
        GameSelection::Mines { picks } => {
            let game = config.mines.build(picks)?;
            Some(mines_rtp(game.model(), picks))
        }
        GameSelection::Slots | GameSelection::Blackjack => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlinkoConfig;
    use crate::games::combinatorics::binomial_pmf;
    use crate::games::types::RiskTier;

    #[test]
    fn test_scratch_is_exactly_ninety() {
        let rtp = expected_rtp(&GourmetConfig::default(), &GameSelection::Scratch).unwrap().unwrap();
        assert!((rtp - 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_high_risk_plinko_matches_hand_sum() {
        let board = PlinkoConfig::default().build(RiskTier::High).unwrap();
        let row = [130.0, 35.0, 10.0, 1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.5, 10.0, 35.0, 130.0];
        let by_hand: f64 = (0..=13).map(|k| binomial_pmf(13, k, 0.5) * row[k as usize]).sum::<f64>() * 100.0;

        assert!((plinko_rtp(&board) - by_hand).abs() < 1e-9);
        // 2 * (130 + 35*13 + 10*78 + 1.5*286) / 8192
        let closed_form = 2.0 * (130.0 + 455.0 + 780.0 + 429.0) / 8192.0 * 100.0;
        assert!((by_hand - closed_form).abs() < 1e-9);
    }

    #[test]
    fn test_crash_fixed_cashout() {
        let generator = CrashGenerator::new(10.0, 0.25).unwrap();
        // 2 * (1/2 - 10/90)
        let expected = 2.0 * (0.5 - 10.0 / 90.0) * 100.0;
        assert!((crash_rtp(&generator, CashoutStrategy::Fixed(2.0)) - expected).abs() < 1e-9);
        assert_eq!(crash_rtp(&generator, CashoutStrategy::Never), 0.0);
        // Past the largest possible crash point nothing is ever collected
        assert_eq!(crash_rtp(&generator, CashoutStrategy::Fixed(9.5)), 0.0);
    }

    #[test]
    fn test_mines_rtp_tracks_house_edge() {
        let model = MinesModel::new(5, 3, 10.0).unwrap();
        // 22/25 * 1.02
        assert!((mines_rtp(&model, 1) - 22.0 / 25.0 * 1.02 * 100.0).abs() < 1e-9);
        for picks in 1..=10 {
            let rtp = mines_rtp(&model, picks);
            assert!((rtp - 90.0).abs() < 1.0, "picks {} gives {}", picks, rtp);
        }
    }

    #[test]
    fn test_slots_have_no_closed_form() {
        assert_eq!(expected_rtp(&GourmetConfig::default(), &GameSelection::Slots).unwrap(), None);
    }
}
