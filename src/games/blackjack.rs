//! Blackjack against an infinite shoe
//!
//! The player follows the dealer's own policy (draw below 17), which keeps
//! the hand a pure function of the draws and lets the estimator price the
//! payout table directly.

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError};
use crate::games::types::{GameType, HandResult, Outcome};
use serde::{Deserialize, Serialize};

const BLACKJACK: u8 = 21;

/// Payout table and drawing policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackRules {
    /// Total return on a natural, stake included
    pub blackjack_payout: f64,
    pub win_payout: f64,
    pub push_payout: f64,
    /// Ties go to the house instead of returning the stake
    pub dealer_wins_ties: bool,
    /// Share of the profit on winning hands kept by the house
    pub commission_percent: f64,
    pub player_stands_on: u8,
    pub dealer_stands_on: u8,
}

impl Default for BlackjackRules {
    fn default() -> Self {
        Self {
            blackjack_payout: 2.5,
            win_payout: 2.0,
            push_payout: 1.0,
            dealer_wins_ties: false,
            commission_percent: 0.0,
            player_stands_on: 17,
            dealer_stands_on: 17,
        }
    }
}

impl BlackjackRules {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("blackjack.blackjack_payout", self.blackjack_payout),
            ("blackjack.win_payout", self.win_payout),
            ("blackjack.push_payout", self.push_payout),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::invalid(field, value, "must be a non-negative number"));
            }
        }
        if !(0.0..100.0).contains(&self.commission_percent) {
            return Err(ConfigurationError::invalid(
                "blackjack.commission_percent",
                self.commission_percent,
                "must be in [0, 100)",
            ));
        }
        for (field, value) in [
            ("blackjack.player_stands_on", self.player_stands_on),
            ("blackjack.dealer_stands_on", self.dealer_stands_on),
        ] {
            if !(12..=BLACKJACK).contains(&value) {
                return Err(ConfigurationError::invalid(field, value, "must be between 12 and 21"));
            }
        }
        Ok(())
    }

    /// Total return for a settled hand, as a multiple of the wager
    pub fn multiplier(&self, result: HandResult) -> f64 {
        let gross = match result {
            HandResult::Blackjack => self.blackjack_payout,
            HandResult::Win => self.win_payout,
            HandResult::Push => self.push_payout,
            HandResult::Loss => 0.0,
        };
        match result {
            HandResult::Blackjack | HandResult::Win if gross > 1.0 => {
                1.0 + (gross - 1.0) * (1.0 - self.commission_percent / 100.0)
            }
            _ => gross,
        }
    }
}

/// Card value with aces counted as 1
pub fn draw_card<R: RandomSource + ?Sized>(rng: &mut R) -> Result<u8, RandomSourceError> {
    Ok(match rng.next_index(13)? {
        0 => 1,
        rank @ 1..=8 => rank as u8 + 1,
        _ => 10,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<u8>,
}

impl Hand {
    pub fn from_cards(cards: impl IntoIterator<Item = u8>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn push(&mut self, card: u8) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[u8] {
        &self.cards
    }

    fn hard_total(&self) -> u8 {
        self.cards.iter().sum()
    }

    /// Whether an ace is currently counted as 11
    pub fn is_soft(&self) -> bool {
        self.cards.contains(&1) && self.hard_total() + 10 <= BLACKJACK
    }

    pub fn total(&self) -> u8 {
        if self.is_soft() {
            self.hard_total() + 10
        } else {
            self.hard_total()
        }
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.total() == BLACKJACK
    }

    pub fn is_bust(&self) -> bool {
        self.total() > BLACKJACK
    }
}

/// Final hands and how they settled
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedHand {
    pub player: Hand,
    pub dealer: Hand,
    pub result: HandResult,
}

/// Deal, draw both hands to their standing totals and compare
pub fn play_hand<R: RandomSource + ?Sized>(rules: &BlackjackRules, rng: &mut R) -> Result<PlayedHand, RandomSourceError> {
    let mut player = Hand::default();
    let mut dealer = Hand::default();
    for _ in 0..2 {
        player.push(draw_card(rng)?);
        dealer.push(draw_card(rng)?);
    }

    let result = match (player.is_blackjack(), dealer.is_blackjack()) {
        (true, true) => Some(HandResult::Push),
        (true, false) => Some(HandResult::Blackjack),
        (false, true) => Some(HandResult::Loss),
        (false, false) => None,
    };
    if let Some(result) = result {
        return Ok(PlayedHand { player, dealer, result: settle_tie(rules, result) });
    }

    while player.total() < rules.player_stands_on {
        player.push(draw_card(rng)?);
    }
    if player.is_bust() {
        return Ok(PlayedHand { player, dealer, result: HandResult::Loss });
    }

    // Dealer stands on every 17, soft ones included
    while dealer.total() < rules.dealer_stands_on {
        dealer.push(draw_card(rng)?);
    }

    let result = if dealer.is_bust() || player.total() > dealer.total() {
        HandResult::Win
    } else if player.total() == dealer.total() {
        HandResult::Push
    } else {
        HandResult::Loss
    };

    Ok(PlayedHand { player, dealer, result: settle_tie(rules, result) })
}

fn settle_tie(rules: &BlackjackRules, result: HandResult) -> HandResult {
    match result {
        HandResult::Push if rules.dealer_wins_ties => HandResult::Loss,
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackjackGame {
    rules: BlackjackRules,
}

impl BlackjackGame {
    pub fn new(rules: BlackjackRules) -> Result<Self, ConfigurationError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &BlackjackRules {
        &self.rules
    }
}

impl GameModel for BlackjackGame {
    fn game_type(&self) -> GameType {
        GameType::Blackjack
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let hand = play_hand(&self.rules, rng)?;
        Ok(Outcome::BlackjackHand {
            player_total: hand.player.total(),
            dealer_total: hand.dealer.total(),
            result: hand.result,
            payout: wager * self.rules.multiplier(hand.result),
        })
    }
}
