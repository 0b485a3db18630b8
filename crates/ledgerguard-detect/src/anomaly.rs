//! Statistical amount anomaly detection.
//!
//! Flags a transaction whose amount deviates from the claimant's own
//! same-category history by more than a configured number of standard
//! deviations. Sparse history suppresses the flag instead of fabricating a
//! signal.

use crate::types::AnomalyScore;
use ledgerguard_core::config::FraudPreventionConfig;
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{SignalKind, Transaction};

/// Statistical outlier detector.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    metadata: DetectorMetadata,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    /// Create a new anomaly detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("detect/anomaly", SignalKind::Anomaly)
                .with_description("Z-score amount outliers against same-category history"),
        }
    }

    /// Score a transaction's amount against its category history.
    ///
    /// The standard deviation is floored at one minor unit, so a uniform
    /// history plus a differing amount yields the maximum deviation rather
    /// than a division error.
    pub fn compute(
        transaction: &Transaction,
        history: &[Transaction],
        config: &FraudPreventionConfig,
    ) -> AnomalyScore {
        let amounts: Vec<f64> = history
            .iter()
            .filter(|prior| prior.category_code == transaction.category_code)
            .map(|prior| prior.amount as f64)
            .collect();

        if amounts.len() < config.anomaly_min_samples {
            return AnomalyScore::none(format!(
                "insufficient category history ({} of {} required samples)",
                amounts.len(),
                config.anomaly_min_samples
            ));
        }

        let n = amounts.len() as f64;
        let mean = amounts.iter().sum::<f64>() / n;
        let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt().max(1.0);

        let z = ((transaction.amount as f64) - mean).abs() / std_dev;
        let threshold = config.anomaly_std_deviation_threshold;
        let is_anomaly = z >= threshold;
        let score = if is_anomaly {
            (z / (2.0 * threshold)).min(1.0)
        } else {
            0.0
        };

        let reason = if is_anomaly {
            format!(
                "amount {} deviates {:.1} standard deviations from the category mean {:.0}",
                transaction.amount, z, mean
            )
        } else {
            format!(
                "amount {} is within {:.1} standard deviations of the category mean {:.0}",
                transaction.amount, z, mean
            )
        };

        AnomalyScore {
            is_anomaly,
            score,
            reason,
        }
    }
}

impl Detector for AnomalyDetector {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}
