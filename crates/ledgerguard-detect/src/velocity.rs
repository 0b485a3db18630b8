//! Transaction velocity spike detection.
//!
//! Compares the claimant's recent transaction rate (per day, trailing short
//! window) against a longer baseline window. An empty or sparse baseline
//! resolves to "no spike" rather than an infinite acceleration.

use crate::types::VelocityCheck;
use chrono::NaiveDate;
use ledgerguard_core::config::FraudPreventionConfig;
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{SignalKind, Transaction};

/// Transaction-rate spike detector.
#[derive(Debug, Clone)]
pub struct VelocityChecker {
    metadata: DetectorMetadata,
}

impl Default for VelocityChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityChecker {
    /// Create a new velocity checker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("detect/velocity", SignalKind::Velocity)
                .with_description("Trailing-window transaction rate vs baseline rate"),
        }
    }

    /// Compare the rate around the transaction's date against the baseline.
    ///
    /// The current rate counts history inside the trailing current window
    /// plus the transaction itself; the baseline rate counts history inside
    /// the trailing baseline window only.
    pub fn compute(
        as_of: NaiveDate,
        history: &[Transaction],
        config: &FraudPreventionConfig,
    ) -> VelocityCheck {
        let current_days = i64::from(config.velocity_current_window_days);
        let baseline_days = i64::from(config.velocity_baseline_window_days);

        let current_count = count_in_trailing_window(history, as_of, current_days) + 1;
        let baseline_count = count_in_trailing_window(history, as_of, baseline_days);

        let current_rate = current_count as f64 / current_days as f64;
        let historical_rate = baseline_count as f64 / baseline_days as f64;

        if baseline_count < config.velocity_min_baseline_count || historical_rate == 0.0 {
            return VelocityCheck::none(current_rate, historical_rate);
        }

        let acceleration_rate = current_rate / historical_rate;
        VelocityCheck {
            is_spike: acceleration_rate > config.velocity_increase_threshold,
            current_rate,
            historical_rate,
            acceleration_rate,
        }
    }
}

impl Detector for VelocityChecker {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}

/// Count history transactions with `as_of - days < date <= as_of`.
fn count_in_trailing_window(history: &[Transaction], as_of: NaiveDate, days: i64) -> usize {
    history
        .iter()
        .filter(|tx| {
            let age = (as_of - tx.date).num_days();
            (0..days).contains(&age)
        })
        .count()
}
