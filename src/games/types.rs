use crate::errors::ConfigurationError;
use crate::games::crash::CashoutStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Slots,
    Scratch,
    Crash,
    Plinko,
    Mines,
    Blackjack,
}

impl GameType {
    /// Name the game is sold under
    pub fn title(&self) -> &'static str {
        match self {
            GameType::Slots => "Fruit Frenzy",
            GameType::Scratch => "Sugar Scratch",
            GameType::Crash => "Icicle Pop",
            GameType::Plinko => "Candy Drop",
            GameType::Mines => "Sour Apple",
            GameType::Blackjack => "Blackjack",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Slots => write!(f, "slots"),
            GameType::Scratch => write!(f, "scratch"),
            GameType::Crash => write!(f, "crash"),
            GameType::Plinko => write!(f, "plinko"),
            GameType::Mines => write!(f, "mines"),
            GameType::Blackjack => write!(f, "blackjack"),
        }
    }
}

/// Slot reel icon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Diamond,
    Seven,
    Scatter,
}

impl Symbol {
    pub const ALL: [Symbol; 7] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Grape,
        Symbol::Diamond,
        Symbol::Seven,
        Symbol::Scatter,
    ];
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Symbol::Cherry => "CHERRY",
            Symbol::Lemon => "LEMON",
            Symbol::Orange => "ORANGE",
            Symbol::Grape => "GRAPE",
            Symbol::Diamond => "DIAMOND",
            Symbol::Seven => "SEVEN",
            Symbol::Scatter => "SCATTER",
        };
        write!(f, "{}", name)
    }
}

/// Plinko risk tier, selects the multiplier row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskTier {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(ConfigurationError::invalid("risk", other, "expected low, medium or high")),
        }
    }
}

/// Best win found on one payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    pub row: usize,
    pub start: usize,
    pub symbol: Symbol,
    pub run: usize,
    pub multiplier: f64,
    pub payout: f64,
}

/// How a blackjack hand settled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandResult {
    Blackjack,
    Win,
    Push,
    Loss,
}

/// Settled round outcome (discriminated union)
///
/// Each variant carries only what its game needs; the auxiliary fields are
/// descriptive and never change the payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    SlotWin {
        grid: Vec<Vec<Symbol>>,
        lines: Vec<LineWin>,
        near_miss: bool,
        payout: f64,
    },
    CrashBust {
        crash_point: f64,
    },
    CrashCashout {
        crash_point: f64,
        cashed_out_at: f64,
        payout: f64,
    },
    PlinkoBucket {
        bucket: usize,
        multiplier: f64,
        payout: f64,
    },
    MinesReveal {
        picks: u32,
        busted: bool,
        multiplier: f64,
        payout: f64,
    },
    ScratchMatch {
        matches: u8,
        multiplier: f64,
        payout: f64,
    },
    BlackjackHand {
        player_total: u8,
        dealer_total: u8,
        result: HandResult,
        payout: f64,
    },
}

impl Outcome {
    /// Amount credited back to the player, 0 meaning total loss
    pub fn payout(&self) -> f64 {
        match self {
            Outcome::SlotWin { payout, .. }
            | Outcome::CrashCashout { payout, .. }
            | Outcome::PlinkoBucket { payout, .. }
            | Outcome::MinesReveal { payout, .. }
            | Outcome::ScratchMatch { payout, .. }
            | Outcome::BlackjackHand { payout, .. } => *payout,
            Outcome::CrashBust { .. } => 0.0,
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            Outcome::SlotWin { .. } => GameType::Slots,
            Outcome::CrashBust { .. } | Outcome::CrashCashout { .. } => GameType::Crash,
            Outcome::PlinkoBucket { .. } => GameType::Plinko,
            Outcome::MinesReveal { .. } => GameType::Mines,
            Outcome::ScratchMatch { .. } => GameType::Scratch,
            Outcome::BlackjackHand { .. } => GameType::Blackjack,
        }
    }

    pub fn is_win(&self) -> bool {
        self.payout() > 0.0
    }
}

/// Game and player choices that select a configured model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameSelection {
    Slots,
    Scratch,
    Crash { cashout: CashoutStrategy },
    Plinko { risk: RiskTier },
    Mines { picks: u32 },
    Blackjack,
}

impl GameSelection {
    pub fn game_type(&self) -> GameType {
        match self {
            GameSelection::Slots => GameType::Slots,
            GameSelection::Scratch => GameType::Scratch,
            GameSelection::Crash { .. } => GameType::Crash,
            GameSelection::Plinko { .. } => GameType::Plinko,
            GameSelection::Mines { .. } => GameType::Mines,
            GameSelection::Blackjack => GameType::Blackjack,
        }
    }
}

impl fmt::Display for GameSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSelection::Crash { cashout } => write!(f, "crash ({})", cashout),
            GameSelection::Plinko { risk } => write!(f, "plinko ({} risk)", risk),
            GameSelection::Mines { picks } => write!(f, "mines ({} picks)", picks),
            other => write!(f, "{}", other.game_type()),
        }
    }
}

/// Request to play one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRequest {
    pub player_id: String,
    pub selection: GameSelection,
    pub wager: f64,
}

/// Settled round handed back to the surrounding application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_id: String,
    pub player_id: String,
    pub game_type: GameType,
    pub wager: f64,
    pub payout: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub outcome: Outcome,
}

impl RoundResult {
    /// Balance change for the player: payout minus wager
    pub fn net(&self) -> f64 {
        self.payout - self.wager
    }
}
