//! Duplicate charge detection.
//!
//! Compares one transaction against the claimant's history and scores the
//! closest match on three attributes: amount, calendar date, and normalized
//! description. Amount carries the highest weight, then date, then
//! description.

use crate::types::DuplicateCheck;
use ledgerguard_core::config::FraudPreventionConfig;
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{SignalKind, Transaction};

/// Attribute weight for an amount match.
const AMOUNT_WEIGHT: f64 = 0.5;
/// Attribute weight for a calendar-date match.
const DATE_WEIGHT: f64 = 0.3;
/// Attribute weight for a normalized-description match.
const DESCRIPTION_WEIGHT: f64 = 0.2;

/// Fuzzy duplicate detector.
///
/// Stateless; `compute` is a pure function of the transaction, the history,
/// and the configured score floor.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    metadata: DetectorMetadata,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateDetector {
    /// Create a new duplicate detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("detect/duplicate", SignalKind::Duplicate)
                .with_description("Fuzzy duplicate matching on amount, date, and description"),
        }
    }

    /// Score a transaction against the claimant's history.
    ///
    /// Returns the best (highest-scoring) match; ties keep the earliest
    /// history entry so repeated checks stay deterministic.
    pub fn compute(
        transaction: &Transaction,
        history: &[Transaction],
        config: &FraudPreventionConfig,
    ) -> DuplicateCheck {
        let current_description = normalize_description(&transaction.description);

        let mut best = DuplicateCheck::none();
        for prior in history {
            let same_amount = prior.amount == transaction.amount
                && prior.currency == transaction.currency;
            let same_date = prior.date == transaction.date;
            let same_description =
                normalize_description(&prior.description) == current_description;

            let score = f64::from(u8::from(same_amount)) * AMOUNT_WEIGHT
                + f64::from(u8::from(same_date)) * DATE_WEIGHT
                + f64::from(u8::from(same_description)) * DESCRIPTION_WEIGHT;

            if score > best.duplicate_score {
                best = DuplicateCheck {
                    is_duplicate: false,
                    duplicate_score: score,
                    same_amount,
                    same_date,
                    same_description,
                    matched_transaction_id: Some(prior.id),
                };
            }
        }

        best.is_duplicate = best.duplicate_score >= config.duplicate_score_threshold;
        best
    }
}

impl Detector for DuplicateDetector {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}

/// Lowercase and collapse whitespace so formatting differences do not defeat
/// the description match.
fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
