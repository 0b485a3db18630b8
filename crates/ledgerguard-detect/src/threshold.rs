//! Spending threshold monitoring.
//!
//! Compares a transaction's amount and the claimant's rolling spend against
//! the resolved per-category limits. Windows are calendar windows relative to
//! the transaction's date: same day, same month, same year.

use crate::types::{LimitWindow, ThresholdStatus};
use chrono::Datelike;
use ledgerguard_core::config::ThresholdConfig;
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{SignalKind, Transaction};

/// Spending threshold monitor.
#[derive(Debug, Clone)]
pub struct ThresholdMonitor {
    metadata: DetectorMetadata,
}

impl Default for ThresholdMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ThresholdMonitor {
    /// Create a new threshold monitor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: DetectorMetadata::new("detect/threshold", SignalKind::Threshold)
                .with_description("Per-category spending limits over calendar windows"),
        }
    }

    /// Evaluate a transaction against its resolved threshold configuration.
    ///
    /// History is filtered to the transaction's category; sums always include
    /// the current transaction.
    pub fn compute(
        transaction: &Transaction,
        config: &ThresholdConfig,
        history: &[Transaction],
    ) -> ThresholdStatus {
        let same_category: Vec<&Transaction> = history
            .iter()
            .filter(|prior| prior.category_code.as_deref() == Some(config.category_code.as_str()))
            .collect();

        let daily_spent: i64 = same_category
            .iter()
            .filter(|prior| prior.date == transaction.date)
            .map(|prior| prior.amount)
            .sum::<i64>()
            + transaction.amount;
        let monthly_spent: i64 = same_category
            .iter()
            .filter(|prior| {
                prior.date.year() == transaction.date.year()
                    && prior.date.month() == transaction.date.month()
            })
            .map(|prior| prior.amount)
            .sum::<i64>()
            + transaction.amount;
        let annual_spent: i64 = same_category
            .iter()
            .filter(|prior| prior.date.year() == transaction.date.year())
            .map(|prior| prior.amount)
            .sum::<i64>()
            + transaction.amount;

        // Window order fixes which limit is reported when several trip.
        let windows = [
            (
                LimitWindow::PerTransaction,
                percentage(transaction.amount, config.per_transaction_limit),
            ),
            (LimitWindow::Daily, percentage(daily_spent, config.daily_limit)),
            (
                LimitWindow::Monthly,
                percentage(monthly_spent, config.monthly_limit),
            ),
            (
                LimitWindow::Annual,
                percentage(annual_spent, config.annual_limit),
            ),
        ];

        let exceeded = windows.iter().find(|(_, pct)| *pct >= 1.0);
        let warned = windows
            .iter()
            .find(|(_, pct)| *pct >= config.warning_threshold && *pct < 1.0);

        ThresholdStatus {
            category_code: config.category_code.clone(),
            has_exceeded: exceeded.is_some(),
            has_warning: exceeded.is_none() && warned.is_some(),
            per_transaction_percentage: windows[0].1,
            daily_percentage: windows[1].1,
            monthly_percentage: windows[2].1,
            annual_percentage: windows[3].1,
            warning_threshold: config.warning_threshold,
            limit_type: exceeded.or(warned).map(|(window, _)| *window),
        }
    }
}

impl Detector for ThresholdMonitor {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}

fn percentage(spent: i64, limit: Option<i64>) -> f64 {
    match limit {
        Some(limit) if limit > 0 => spent as f64 / limit as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn office_supply(amount: i64, date: NaiveDate) -> Transaction {
        Transaction::new(Uuid::nil(), amount, "EUR", date, "supplies")
            .with_category("OFFICE_SUPPLIES")
    }

    fn office_config() -> ThresholdConfig {
        ThresholdConfig::new("*", "OFFICE_SUPPLIES")
            .with_per_transaction_limit(80_000)
            .with_daily_limit(150_000)
            .with_monthly_limit(400_000)
    }

    #[test]
    fn test_per_transaction_limit_exceeded() {
        let tx = office_supply(85_000, date(2025, 3, 10));
        let status = ThresholdMonitor::compute(&tx, &office_config(), &[]);

        assert!(status.has_exceeded);
        assert!(!status.has_warning);
        assert_eq!(status.limit_type, Some(LimitWindow::PerTransaction));
        assert!(status.per_transaction_percentage > 1.0);
    }

    #[test]
    fn test_warning_at_exact_warning_ratio() {
        // 320_000 of the 400_000 monthly limit is exactly the 0.8 warning ratio.
        let history = vec![office_supply(280_000, date(2025, 3, 3))];
        let tx = office_supply(40_000, date(2025, 3, 10));

        let status = ThresholdMonitor::compute(&tx, &office_config(), &history);

        assert!(!status.has_exceeded);
        assert!(status.has_warning);
        assert_eq!(status.limit_type, Some(LimitWindow::Monthly));
        assert!((status.monthly_percentage - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_daily_window_sums_same_date_only() {
        let history = vec![
            office_supply(100_000, date(2025, 3, 10)),
            office_supply(100_000, date(2025, 3, 9)),
        ];
        let tx = office_supply(60_000, date(2025, 3, 10));

        let status = ThresholdMonitor::compute(&tx, &office_config(), &history);

        // 160_000 of 150_000 daily; the per-transaction window is still fine.
        assert!(status.has_exceeded);
        assert_eq!(status.limit_type, Some(LimitWindow::Daily));
        assert!((status.daily_percentage - 160_000.0 / 150_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_categories_do_not_count() {
        let other = Transaction::new(Uuid::nil(), 140_000, "EUR", date(2025, 3, 10), "flights")
            .with_category("TRAVEL");
        let tx = office_supply(10_000, date(2025, 3, 10));

        let status = ThresholdMonitor::compute(&tx, &office_config(), &[other]);

        assert!(!status.has_exceeded);
        assert!(!status.has_warning);
        assert_eq!(status.limit_type, None);
    }

    #[test]
    fn test_unlimited_windows_stay_at_zero() {
        let config = ThresholdConfig::new("*", "OFFICE_SUPPLIES").with_monthly_limit(400_000);
        let tx = office_supply(1_000, date(2025, 3, 10));

        let status = ThresholdMonitor::compute(&tx, &config, &[]);

        assert_eq!(status.per_transaction_percentage, 0.0);
        assert_eq!(status.daily_percentage, 0.0);
        assert!(status.monthly_percentage > 0.0);
    }
}
