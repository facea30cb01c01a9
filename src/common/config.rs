//! Configuration loading for the Gourmet RTP engine
//!
//! TOML file first, then `GOURMET_*` environment overrides, then validation.

use crate::config::{
    CrashConfig, GourmetConfig, MinesConfig, MonitoringConfig, PlinkoConfig, ScratchConfig,
    SimulationConfig, SlotsConfig,
};
use crate::errors::{ConfigurationError, GourmetResult};
use crate::games::blackjack::BlackjackRules;
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> GourmetResult<GourmetConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            GourmetConfig::default()
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> GourmetResult<GourmetConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Save configuration to file
    pub fn save(&self, config: &GourmetConfig, path: &str) -> GourmetResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn parse_override<T: FromStr>(key: &str, raw: String, reason: &str) -> Result<T, ConfigurationError> {
    raw.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value: raw,
        reason: reason.to_string(),
    })
}

/// Apply `GOURMET_*` overrides; `lookup` is `std::env::var` outside tests
pub fn apply_overrides(
    config: &mut GourmetConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigurationError> {
    // Game edges
    if let Some(raw) = lookup("GOURMET_CRASH_HOUSE_EDGE") {
        config.crash.house_edge_percent = parse_override("GOURMET_CRASH_HOUSE_EDGE", raw, "Invalid percentage")?;
    }
    if let Some(raw) = lookup("GOURMET_MINES_HOUSE_EDGE") {
        config.mines.house_edge_percent = parse_override("GOURMET_MINES_HOUSE_EDGE", raw, "Invalid percentage")?;
    }

    // Simulation overrides
    if let Some(raw) = lookup("GOURMET_SIM_TRIALS") {
        config.simulation.trials = parse_override("GOURMET_SIM_TRIALS", raw, "Invalid trial count")?;
    }
    if let Some(raw) = lookup("GOURMET_SIM_SEED") {
        config.simulation.seed = parse_override("GOURMET_SIM_SEED", raw, "Invalid seed")?;
    }
    if let Some(raw) = lookup("GOURMET_SIM_WORKERS") {
        config.simulation.workers = parse_override("GOURMET_SIM_WORKERS", raw, "Invalid worker count")?;
    }

    Ok(())
}

/// Builder pattern for creating configurations
#[derive(Debug)]
pub struct ConfigBuilder {
    config: GourmetConfig,
}

impl ConfigBuilder {
    /// Create a new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: GourmetConfig::default(),
        }
    }

    pub fn slots(mut self, slots: SlotsConfig) -> Self {
        self.config.slots = slots;
        self
    }

    pub fn scratch(mut self, scratch: ScratchConfig) -> Self {
        self.config.scratch = scratch;
        self
    }

    pub fn crash(mut self, crash: CrashConfig) -> Self {
        self.config.crash = crash;
        self
    }

    pub fn plinko(mut self, plinko: PlinkoConfig) -> Self {
        self.config.plinko = plinko;
        self
    }

    pub fn mines(mut self, mines: MinesConfig) -> Self {
        self.config.mines = mines;
        self
    }

    pub fn blackjack(mut self, blackjack: BlackjackRules) -> Self {
        self.config.blackjack = blackjack;
        self
    }

    pub fn simulation(mut self, simulation: SimulationConfig) -> Self {
        self.config.simulation = simulation;
        self
    }

    pub fn monitoring(mut self, monitoring: MonitoringConfig) -> Self {
        self.config.monitoring = monitoring;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> GourmetResult<GourmetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> GourmetResult<()> {
    let config = GourmetConfig::default();
    let loader = ConfigLoader::new();
    loader.save(&config, path)
}
