//! Human-readable and JSON reports for RTP runs

use crate::errors::GourmetResult;
use crate::simulation::scenarios::{PlinkoAdjustment, ScenarioResult};

/// Report formatting for scenario results
pub struct RtpReporter;

impl RtpReporter {
    /// Full report for one scenario
    pub fn generate_report(result: &ScenarioResult) -> String {
        let estimate = &result.estimate;
        let (ci_low, ci_high) = estimate.ci95();
        let mut report = String::new();

        report.push_str(&format!("🎯 {}\n", result.scenario));
        report.push_str(&format!("{}\n", "=".repeat(50)));
        report.push_str(&format!("⏱️  Execution Time: {:?}\n", result.execution_time));
        report.push_str(&format!(
            "🎮 Rounds: {}, Wagered: {:.2}, Paid: {:.2}\n",
            estimate.trials, estimate.total_wagered, estimate.total_payout
        ));
        report.push_str(&format!(
            "📈 RTP: {:.3}% ± {:.3} (95% CI {:.3} to {:.3})\n",
            estimate.rtp, estimate.stderr_pct, ci_low, ci_high
        ));
        if let Some(analytic) = result.analytic_rtp {
            report.push_str(&format!("📐 Exact RTP: {:.3}%\n", analytic));
        }
        report.push_str(&format!("🏠 House Edge: {:.3}%\n", estimate.house_edge()));
        report.push_str(&format!(
            "🏆 Hit Rate: {:.1}%, Max Payout: {:.2}x\n",
            estimate.hit_rate * 100.0,
            estimate.max_payout / estimate.wager
        ));
        report.push_str(&format!(
            "✅ Band {:.1}% to {:.1}%: {}\n",
            result.band.0, result.band.1, result.verdict
        ));

        report
    }

    /// One line per scenario
    pub fn summary(results: &[ScenarioResult]) -> String {
        let mut report = String::from("\n=== SUMMARY ===\n");
        for result in results {
            let exact = result
                .analytic_rtp
                .map(|rtp| format!(" (exact {:.2}%)", rtp))
                .unwrap_or_default();
            report.push_str(&format!(
                "{:<40} {:>8.3}% ± {:.3}{}  {}\n",
                result.scenario, result.estimate.rtp, result.estimate.stderr_pct, exact, result.verdict
            ));
        }
        report
    }

    /// "Multiply all multipliers by" table for the Plinko tiers
    pub fn adjustments(adjustments: &[PlinkoAdjustment], target_rtp: f64) -> String {
        let mut report = format!("\n=== CANDY DROP ADJUSTMENTS (target {:.1}%) ===\n", target_rtp);
        for adjustment in adjustments {
            let row: Vec<String> = adjustment
                .adjusted
                .values()
                .iter()
                .map(|m| format!("{:.2}", m))
                .collect();
            report.push_str(&format!(
                "{:<7} current {:>7.3}%  multiply all multipliers by {:.4}\n        [{}]\n",
                adjustment.risk.to_string(),
                adjustment.current_rtp,
                adjustment.factor,
                row.join(", ")
            ));
        }
        report
    }

    pub fn to_json(results: &[ScenarioResult]) -> GourmetResult<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }
}
