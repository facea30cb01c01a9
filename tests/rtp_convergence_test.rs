//! Long-run convergence of the Monte Carlo estimator against exact RTPs

use gourmet_rtp::config::GourmetConfig;
use gourmet_rtp::games::crash::CashoutStrategy;
use gourmet_rtp::games::processor::GameProcessor;
use gourmet_rtp::games::types::{GameSelection, RiskTier};
use gourmet_rtp::simulation::analytic::expected_rtp;
use gourmet_rtp::simulation::estimator::{estimate_rtp_parallel, RtpEstimate, Verdict};
use gourmet_rtp::simulation::{standard_suite, ScenarioRunner};

fn estimate(config: &GourmetConfig, selection: GameSelection, trials: u64) -> RtpEstimate {
    let processor = GameProcessor::new(config).expect("Default config must build");
    let model = processor.model(&selection).expect("Selection must be valid");
    estimate_rtp_parallel(&*model, trials, 1.0, 42, 4).expect("Simulation failed")
}

fn exact(config: &GourmetConfig, selection: GameSelection) -> f64 {
    expected_rtp(config, &selection)
        .expect("Selection must be valid")
        .expect("Selection has a closed form")
}

#[test]
fn test_high_risk_plinko_converges_within_one_point() {
    let config = GourmetConfig::default();
    let selection = GameSelection::Plinko { risk: RiskTier::High };

    let estimate = estimate(&config, selection, 1_000_000);
    let analytic = exact(&config, selection);

    // 2 * 1794 / 8192
    assert!((analytic - 43.798828125).abs() < 1e-9);
    assert!(
        (estimate.rtp - analytic).abs() < 1.0,
        "estimated {:.3}% vs exact {:.3}%",
        estimate.rtp,
        analytic
    );
}

#[test]
fn test_scratch_converges_to_ninety() {
    let config = GourmetConfig::default();
    let estimate = estimate(&config, GameSelection::Scratch, 200_000);

    assert!(estimate.consistent_with(90.0, 4.0), "RTP {:.3}% ± {:.3}", estimate.rtp, estimate.stderr_pct);
    // Anything but a zero-match card pays
    assert!((estimate.hit_rate - 0.5).abs() < 0.01);
}

#[test]
fn test_crash_fixed_cashouts_match_survival() {
    let config = GourmetConfig::default();
    for target in [1.5, 2.0, 5.0] {
        let selection = GameSelection::Crash {
            cashout: CashoutStrategy::Fixed(target),
        };
        let estimate = estimate(&config, selection, 200_000);
        let analytic = exact(&config, selection);

        assert!(
            estimate.consistent_with(analytic, 4.0),
            "cash out at {}: {:.3}% vs {:.3}%",
            target,
            estimate.rtp,
            analytic
        );
    }

    let never = GameSelection::Crash {
        cashout: CashoutStrategy::Never,
    };
    assert_eq!(estimate(&config, never, 10_000).rtp, 0.0);
}

#[test]
fn test_default_mines_round_matches_exact_value() {
    let config = GourmetConfig::default();
    let selection = GameSelection::Mines {
        picks: config.mines.default_picks,
    };

    let estimate = estimate(&config, selection, 200_000);
    let analytic = exact(&config, selection);

    // 22/25 * 21/24 * 20/23 survival at a 1.34x cash-out
    assert!((analytic - 9240.0 / 13800.0 * 1.34 * 100.0).abs() < 1e-9);
    assert!(estimate.consistent_with(analytic, 4.0));
}

#[test]
fn test_parallel_estimate_is_reproducible() {
    let config = GourmetConfig::default();
    let first = estimate(&config, GameSelection::Slots, 50_000);
    let second = estimate(&config, GameSelection::Slots, 50_000);

    assert_eq!(first, second);
    assert!(first.rtp > 0.0 && first.rtp.is_finite());
    assert!(first.hit_rate > 0.0);
}

#[test]
fn test_blackjack_payouts_stay_within_rule_bounds() {
    let config = GourmetConfig::default();
    let estimate = estimate(&config, GameSelection::Blackjack, 50_000);

    assert!(estimate.max_payout <= config.blackjack.blackjack_payout);
    assert!(estimate.rtp > 50.0 && estimate.rtp < 150.0);
}

#[test]
fn test_standard_suite_reports_verdicts() {
    let mut config = GourmetConfig::fast_simulation();
    config.simulation.trials = 20_000;

    let runner = ScenarioRunner::new(&config).expect("Fast config must build");
    let results = runner
        .run_all(&standard_suite(&config).expect("Suite must build"))
        .expect("Suite failed");

    assert_eq!(results.len(), 8);
    let crash = results
        .iter()
        .find(|r| matches!(r.selection, GameSelection::Crash { .. }))
        .expect("Crash scenario missing");
    // Cashing out at 2x returns 77.8%, well below a 90% target
    assert_eq!(crash.verdict, Verdict::Outside);

    for result in &results {
        if let Some(agrees) = result.agrees_with_analytic(4.5) {
            assert!(agrees, "{} disagrees with its exact RTP", result.scenario);
        }
    }
}
