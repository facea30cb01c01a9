//! Gourmet RTP verification CLI
//!
//! Runs Monte Carlo RTP checks for the configured games and prints the
//! estimate next to the exact value wherever one exists.

use clap::{Parser, Subcommand};
use gourmet_rtp::{
    common::config::{generate_sample_config, ConfigLoader},
    config::GourmetConfig,
    errors::GourmetResult,
    games::crash::CashoutStrategy,
    games::types::{GameSelection, RiskTier},
    simulation::{plinko_adjustments, standard_suite, RtpReporter, RtpScenario, ScenarioRunner},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gourmet RTP CLI
#[derive(Parser)]
#[command(name = "gourmet-rtp")]
#[command(about = "Monte Carlo RTP verification for the Gourmet Fun mini-games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    /// Rounds to simulate per scenario
    #[arg(short, long, global = true)]
    trials: Option<u64>,

    /// Base seed for the worker streams
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(short, long, global = true)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every game at its configured defaults
    All,

    /// Fruit Frenzy slot machine
    Slots,

    /// Sugar Scratch card
    Scratch,

    /// Icicle Pop crash game
    Crash {
        /// Cash-out target multiplier
        #[arg(long)]
        cashout: Option<f64>,

        /// Ride every round until the crash
        #[arg(long, conflicts_with = "cashout")]
        never: bool,
    },

    /// Candy Drop plinko board
    Plinko {
        /// Risk tier (low, medium, high); all tiers when omitted
        #[arg(short, long)]
        risk: Option<RiskTier>,
    },

    /// Sour Apple mines grid
    Mines {
        /// Bad tiles on the grid
        #[arg(long)]
        bad: Option<u32>,

        /// Safe reveals before cashing out
        #[arg(long)]
        picks: Option<u32>,
    },

    /// Blackjack under the configured rule set
    Blackjack,

    /// Compute Candy Drop multiplier scaling for a target RTP
    Adjust {
        /// Target RTP in percent
        #[arg(long, default_value_t = 90.0)]
        target: f64,
    },

    /// Write the default configuration to a TOML file
    SampleConfig {
        /// Output path
        path: PathBuf,
    },
}

fn main() -> GourmetResult<()> {
    let cli = Cli::parse();

    if let Commands::SampleConfig { path } = &cli.command {
        generate_sample_config(&path.to_string_lossy())?;
        println!("Sample configuration written to {}", path.display());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new().with_path(path).load()?,
        None => ConfigLoader::new().load()?,
    };
    init_logging(&config, cli.verbose);

    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    info!(
        "running {} trials per scenario on {} workers (seed {})",
        config.simulation.trials, config.simulation.workers, config.simulation.seed
    );

    let scenarios = match cli.command {
        Commands::All => standard_suite(&config)?,
        Commands::Slots => vec![scenario(&config, GameSelection::Slots)],
        Commands::Scratch => vec![scenario(&config, GameSelection::Scratch)],
        Commands::Crash { cashout, never } => {
            let cashout = if never {
                CashoutStrategy::Never
            } else {
                match cashout {
                    Some(target) => CashoutStrategy::fixed(target)?,
                    None => config.crash.default_strategy()?,
                }
            };
            vec![scenario(&config, GameSelection::Crash { cashout })]
        }
        Commands::Plinko { risk } => {
            let tiers = match risk {
                Some(risk) => vec![risk],
                None => RiskTier::ALL.to_vec(),
            };
            tiers
                .into_iter()
                .map(|risk| scenario(&config, GameSelection::Plinko { risk }))
                .collect()
        }
        Commands::Mines { .. } => {
            let picks = config.mines.default_picks;
            vec![scenario(&config, GameSelection::Mines { picks })]
        }
        Commands::Blackjack => vec![scenario(&config, GameSelection::Blackjack)],
        Commands::Adjust { target } => {
            let adjustments = plinko_adjustments(&config, target)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&adjustments)?);
            } else {
                print!("{}", RtpReporter::adjustments(&adjustments, target));
            }
            return Ok(());
        }
        Commands::SampleConfig { .. } => return Ok(()),
    };

    let runner = ScenarioRunner::new(&config)?;
    let results = runner.run_all(&scenarios)?;

    if cli.json {
        println!("{}", RtpReporter::to_json(&results)?);
    } else {
        for result in &results {
            println!("{}", RtpReporter::generate_report(result));
        }
        print!("{}", RtpReporter::summary(&results));
    }

    Ok(())
}

/// Command-line values take precedence over the file and the environment
fn apply_cli_overrides(config: &mut GourmetConfig, cli: &Cli) {
    if let Some(trials) = cli.trials {
        config.simulation.trials = trials;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    if let Some(workers) = cli.workers {
        config.simulation.workers = workers;
    }
    if let Commands::Mines { bad, picks } = &cli.command {
        if let Some(bad) = bad {
            config.mines.bad_tiles = *bad;
        }
        if let Some(picks) = picks {
            config.mines.default_picks = *picks;
        }
    }
}

fn scenario(config: &GourmetConfig, selection: GameSelection) -> RtpScenario {
    RtpScenario::new(selection, config.simulation.trials, config.simulation.band())
}

fn init_logging(config: &GourmetConfig, verbose: bool) {
    let default_filter = if verbose {
        "gourmet_rtp=debug".to_string()
    } else if config.monitoring.enable_logging {
        format!("gourmet_rtp={}", config.monitoring.log_level.as_filter())
    } else {
        "off".to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_crash_cashout() {
        let cli = Cli::try_parse_from(["gourmet-rtp", "crash", "--cashout", "1.5", "--trials", "1000"]).unwrap();
        assert_eq!(cli.trials, Some(1000));
        assert!(matches!(cli.command, Commands::Crash { cashout: Some(c), never: false } if c == 1.5));
    }

    #[test]
    fn test_cashout_conflicts_with_never() {
        assert!(Cli::try_parse_from(["gourmet-rtp", "crash", "--cashout", "2", "--never"]).is_err());
    }

    #[test]
    fn test_parse_plinko_risk() {
        let cli = Cli::try_parse_from(["gourmet-rtp", "plinko", "--risk", "high"]).unwrap();
        assert!(matches!(cli.command, Commands::Plinko { risk: Some(RiskTier::High) }));
    }

    #[test]
    fn test_mines_overrides_validate_together() {
        let cli = Cli::try_parse_from(["gourmet-rtp", "mines", "--bad", "23", "--picks", "1", "--trials", "1000"])
            .unwrap();
        let mut config = GourmetConfig::default();
        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.mines.bad_tiles, 23);
        assert_eq!(config.mines.default_picks, 1);
        assert_eq!(config.simulation.trials, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mines_bad_alone_keeps_configured_picks() {
        let cli = Cli::try_parse_from(["gourmet-rtp", "mines", "--bad", "23"]).unwrap();
        let mut config = GourmetConfig::default();
        apply_cli_overrides(&mut config, &cli);

        // 2 safe tiles cannot cover the default 3 picks
        assert_eq!(config.mines.default_picks, 3);
        assert!(config.validate().is_err());
    }
}
