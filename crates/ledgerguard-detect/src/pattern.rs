//! Aggregate behavioral pattern analysis.
//!
//! Unlike the other detectors, this one looks at the whole transaction set
//! (history plus current): round-amount overuse, single-merchant
//! concentration, weekend-heavy timing, and spending spikes at month-end and
//! year-end.

use crate::types::PatternCheck;
use chrono::{Datelike, NaiveDate, Weekday};
use ledgerguard_core::config::FraudPreventionConfig;
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{SignalKind, Transaction};
use std::collections::HashMap;

/// One whole currency unit in minor units; the "round amount" grain.
const ROUND_AMOUNT_UNIT: i64 = 100;
/// Density ratio above which a month/year-end window counts as a spike.
const SPIKE_DENSITY_RATIO: f64 = 1.5;
/// Minimum transactions inside a window before it may count as a spike.
const MIN_WINDOW_COUNT: usize = 3;

/// Whole-set behavioral pattern analyzer.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    metadata: DetectorMetadata,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAnalyzer {
    /// Create a new pattern analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("detect/pattern", SignalKind::Pattern)
                .with_description(
                    "Round amounts, merchant concentration, weekend and period-end timing",
                ),
        }
    }

    /// Analyze history plus the current transaction as one set.
    pub fn compute(
        transaction: &Transaction,
        history: &[Transaction],
        config: &FraudPreventionConfig,
    ) -> PatternCheck {
        let set: Vec<&Transaction> = history.iter().chain(std::iter::once(transaction)).collect();
        let n = set.len() as f64;

        let round_count = set
            .iter()
            .filter(|tx| tx.amount % ROUND_AMOUNT_UNIT == 0)
            .count();

        let mut merchant_counts: HashMap<String, usize> = HashMap::new();
        for tx in &set {
            if let Some(merchant) = &tx.merchant_name {
                *merchant_counts
                    .entry(merchant.trim().to_lowercase())
                    .or_insert(0) += 1;
            }
        }
        let top_merchant_count = merchant_counts.values().max().copied().unwrap_or(0);

        let weekend_count = set
            .iter()
            .filter(|tx| {
                matches!(tx.date.weekday(), Weekday::Sat | Weekday::Sun)
            })
            .count();

        let month_end_count = set
            .iter()
            .filter(|tx| in_month_end_window(tx.date, config.end_of_month_days))
            .count();
        let year_end_count = set
            .iter()
            .filter(|tx| in_year_end_window(tx.date, config.year_end_days))
            .count();

        // Density relative to a uniform spread over the period.
        let month_end_ratio =
            density_ratio(month_end_count, set.len(), f64::from(config.end_of_month_days) / 30.0);
        let year_end_ratio =
            density_ratio(year_end_count, set.len(), f64::from(config.year_end_days) / 365.0);

        PatternCheck {
            round_amount_ratio: round_count as f64 / n,
            merchant_concentration: top_merchant_count as f64 / n,
            weekend_transaction_ratio: weekend_count as f64 / n,
            year_end_spike: year_end_ratio > SPIKE_DENSITY_RATIO
                && year_end_count >= MIN_WINDOW_COUNT,
            end_of_month_spike: month_end_ratio > SPIKE_DENSITY_RATIO
                && month_end_count >= MIN_WINDOW_COUNT,
            acceleration_rate: month_end_ratio.max(year_end_ratio),
            transactions_analyzed: set.len(),
        }
    }
}

impl Detector for PatternAnalyzer {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}

fn density_ratio(window_count: usize, total: usize, expected_fraction: f64) -> f64 {
    if total == 0 || expected_fraction <= 0.0 {
        return 0.0;
    }
    (window_count as f64 / total as f64) / expected_fraction
}

fn in_month_end_window(date: NaiveDate, window_days: u32) -> bool {
    date.day() + window_days > days_in_month(date)
}

fn in_year_end_window(date: NaiveDate, window_days: u32) -> bool {
    date.ordinal() + window_days > days_in_year(date.year())
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |last| last.ordinal())
}
