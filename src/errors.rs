//! Error types for the Gourmet RTP engine
//!
//! Misconfiguration is fatal at load time, invalid wagers are rejected before
//! any draw, and an exhausted random source aborts the round it belongs to.
//! Busts, near misses and zero payouts are ordinary outcomes and never show up
//! here.

use std::fmt;

/// Root error type for all engine operations
#[derive(Debug)]
pub enum GourmetError {
    /// Configuration and table validation errors
    Configuration(ConfigurationError),

    /// Wager rejected by the caller-side checks
    Wager(WagerError),

    /// Random source could not produce a draw
    Random(RandomSourceError),

    /// Illegal action inside an interactive round
    Round(RoundError),

    /// Batch simulation failures
    Simulation(SimulationError),
}

/// Configuration and validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl ConfigurationError {
    /// Shorthand for [`ConfigurationError::InvalidValue`]
    pub fn invalid(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Wager validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WagerError {
    #[error("Wager must be positive, got {0}")]
    NonPositive(f64),

    #[error("Wager {wager} exceeds available balance {balance}")]
    ExceedsBalance { wager: f64, balance: f64 },
}

/// Random source errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomSourceError {
    #[error("Random source exhausted after {drawn} draws")]
    Exhausted { drawn: usize },

    #[error("Random source produced {0}, outside [0, 1)")]
    OutOfRange(f64),
}

/// Errors raised by interactive round state machines
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoundError {
    #[error("Tile {index} is outside a board of {tiles} tiles")]
    TileOutOfRange { index: usize, tiles: usize },

    #[error("Tile {0} was already revealed")]
    TileAlreadyRevealed(usize),

    #[error("Round is already finished")]
    RoundFinished,
}

/// Batch simulation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("Simulation worker panicked")]
    WorkerPanicked,

    #[error("Failed to serialize report: {0}")]
    ReportFailed(String),
}

impl fmt::Display for GourmetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GourmetError::Configuration(e) => write!(f, "Configuration error: {}", e),
            GourmetError::Wager(e) => write!(f, "Invalid wager: {}", e),
            GourmetError::Random(e) => write!(f, "Random source error: {}", e),
            GourmetError::Round(e) => write!(f, "Round error: {}", e),
            GourmetError::Simulation(e) => write!(f, "Simulation error: {}", e),
        }
    }
}

impl std::error::Error for GourmetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GourmetError::Configuration(e) => Some(e),
            GourmetError::Wager(e) => Some(e),
            GourmetError::Random(e) => Some(e),
            GourmetError::Round(e) => Some(e),
            GourmetError::Simulation(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for GourmetError {
    fn from(e: ConfigurationError) -> Self {
        GourmetError::Configuration(e)
    }
}

impl From<WagerError> for GourmetError {
    fn from(e: WagerError) -> Self {
        GourmetError::Wager(e)
    }
}

impl From<RandomSourceError> for GourmetError {
    fn from(e: RandomSourceError) -> Self {
        GourmetError::Random(e)
    }
}

impl From<RoundError> for GourmetError {
    fn from(e: RoundError) -> Self {
        GourmetError::Round(e)
    }
}

impl From<SimulationError> for GourmetError {
    fn from(e: SimulationError) -> Self {
        GourmetError::Simulation(e)
    }
}

impl From<std::io::Error> for GourmetError {
    fn from(e: std::io::Error) -> Self {
        GourmetError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl From<serde_json::Error> for GourmetError {
    fn from(e: serde_json::Error) -> Self {
        GourmetError::Simulation(SimulationError::ReportFailed(e.to_string()))
    }
}

// Convenience type alias for Results
pub type GourmetResult<T> = Result<T, GourmetError>;

/// Macro for building a root error from a single-message leaf variant
#[macro_export]
macro_rules! gourmet_error {
    ($variant:expr, $msg:expr) => {
        $crate::errors::GourmetError::from($variant($msg.to_string()))
    };
    ($variant:expr, $fmt:expr, $($args:tt)*) => {
        $crate::errors::GourmetError::from($variant(format!($fmt, $($args)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::ValidationFailed("empty table".to_string());
        let error = GourmetError::Configuration(config_error);

        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("empty table"));
    }

    #[test]
    fn test_invalid_value_details() {
        let error = ConfigurationError::invalid("crash.house_edge_percent", 120.0, "must be in [0, 100)");
        let text = error.to_string();

        assert!(text.contains("crash.house_edge_percent"));
        assert!(text.contains("120"));
        assert!(text.contains("[0, 100)"));
    }

    #[test]
    fn test_wager_error_details() {
        let error = WagerError::ExceedsBalance { wager: 50.0, balance: 10.0 };
        assert!(error.to_string().contains("50"));
        assert!(error.to_string().contains("10"));
    }

    #[test]
    fn test_error_conversion() {
        let error: GourmetError = RandomSourceError::Exhausted { drawn: 3 }.into();

        match error {
            GourmetError::Random(RandomSourceError::Exhausted { drawn }) => assert_eq!(drawn, 3),
            _ => panic!("Expected random source error"),
        }
    }

    #[test]
    fn test_error_source() {
        let error = GourmetError::Wager(WagerError::NonPositive(0.0));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_json_error_is_a_report_failure() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: GourmetError = json_error.into();

        assert!(matches!(error, GourmetError::Simulation(SimulationError::ReportFailed(_))));
        assert!(error.to_string().contains("Failed to serialize report"));
        assert!(!error.to_string().contains("configuration"));
    }

    #[test]
    fn test_error_macro() {
        let error = gourmet_error!(ConfigurationError::MissingRequired, "plinko.high");
        assert!(matches!(
            error,
            GourmetError::Configuration(ConfigurationError::MissingRequired(_))
        ));
    }
}
