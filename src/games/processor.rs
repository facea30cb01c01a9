use crate::common::traits::{GameModel, RandomSource};
use crate::config::GourmetConfig;
use crate::errors::{ConfigurationError, GourmetResult, WagerError};
use crate::games::blackjack::BlackjackGame;
use crate::games::crash::{CrashGame, CrashGenerator};
use crate::games::mines::{MinesGame, MinesModel};
use crate::games::plinko::PlinkoBoard;
use crate::games::scratch::ScratchCard;
use crate::games::slots::SlotMachine;
use crate::games::types::{GameSelection, PlayRequest, RiskTier, RoundResult};
use tracing::debug;
use uuid::Uuid;

/// Reject a wager before any draw happens
pub fn validate_wager(wager: f64, balance: f64) -> Result<(), WagerError> {
    if !wager.is_finite() || wager <= 0.0 {
        return Err(WagerError::NonPositive(wager));
    }
    if wager > balance {
        return Err(WagerError::ExceedsBalance { wager, balance });
    }
    Ok(())
}

/// Settles rounds against models built once from configuration
#[derive(Debug, Clone)]
pub struct GameProcessor {
    slots: SlotMachine,
    scratch: ScratchCard,
    crash: CrashGenerator,
    plinko: [PlinkoBoard; 3],
    mines: MinesModel,
    blackjack: BlackjackGame,
}

impl GameProcessor {
    /// Build every model; misconfiguration surfaces here, never at draw time
    pub fn new(config: &GourmetConfig) -> Result<Self, ConfigurationError> {
        Ok(Self {
            slots: config.slots.build()?,
            scratch: config.scratch.build()?,
            crash: config.crash.generator()?,
            plinko: [
                config.plinko.build(RiskTier::Low)?,
                config.plinko.build(RiskTier::Medium)?,
                config.plinko.build(RiskTier::High)?,
            ],
            mines: config.mines.model()?,
            blackjack: BlackjackGame::new(config.blackjack)?,
        })
    }

    pub fn plinko(&self, tier: RiskTier) -> &PlinkoBoard {
        match tier {
            RiskTier::Low => &self.plinko[0],
            RiskTier::Medium => &self.plinko[1],
            RiskTier::High => &self.plinko[2],
        }
    }

    /// Model that settles rounds for `selection`
    pub fn model(&self, selection: &GameSelection) -> Result<Box<dyn GameModel + '_>, ConfigurationError> {
        let model: Box<dyn GameModel + '_> = match *selection {
            GameSelection::Slots => Box::new(&self.slots),
            GameSelection::Scratch => Box::new(&self.scratch),
            GameSelection::Crash { cashout } => Box::new(CrashGame::new(self.crash, cashout)?),
            GameSelection::Plinko { risk } => Box::new(self.plinko(risk)),
            GameSelection::Mines { picks } => Box::new(MinesGame::new(self.mines, picks)?),
            GameSelection::Blackjack => Box::new(&self.blackjack),
        };
        Ok(model)
    }

    /// Validate the wager, play one round and stamp the result
    pub fn play(
        &self,
        request: &PlayRequest,
        balance: f64,
        rng: &mut dyn RandomSource,
    ) -> GourmetResult<RoundResult> {
        validate_wager(request.wager, balance)?;
        let model = self.model(&request.selection)?;

        let outcome = model.play_round(request.wager, rng)?;
        let round_id = Uuid::new_v4().to_string();
        debug!(
            "round {} for {}: {} wager {} paid {}",
            round_id,
            request.player_id,
            request.selection,
            request.wager,
            outcome.payout()
        );

        Ok(RoundResult {
            round_id,
            player_id: request.player_id.clone(),
            game_type: model.game_type(),
            wager: request.wager,
            payout: outcome.payout(),
            timestamp: chrono::Utc::now(),
            outcome,
        })
    }
}
