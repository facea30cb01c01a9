//! Monte Carlo and exact RTP verification

pub mod analytic;
pub mod estimator;
pub mod report;
pub mod scenarios;

pub use estimator::{estimate_rtp, estimate_rtp_parallel, RtpAccumulator, RtpEstimate, Verdict};
pub use report::RtpReporter;
pub use scenarios::{plinko_adjustments, standard_suite, RtpScenario, ScenarioResult, ScenarioRunner};
