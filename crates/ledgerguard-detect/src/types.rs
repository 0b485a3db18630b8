//! Derived detection results.
//!
//! One output type per detector. Each type has a "no signal" constructor that
//! the detectors fall back to on missing optional data or sparse history.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Duplicate Detection
// ============================================================================

/// Result of fuzzy duplicate matching against the claimant's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    /// True when the composite score reaches the configured floor.
    pub is_duplicate: bool,
    /// Composite similarity to the closest historical match, in [0, 1].
    pub duplicate_score: f64,
    /// The best match has the same amount.
    pub same_amount: bool,
    /// The best match has the same calendar date.
    pub same_date: bool,
    /// The best match has the same normalized description.
    pub same_description: bool,
    /// ID of the best-matching historical transaction, if any scored above zero.
    pub matched_transaction_id: Option<Uuid>,
}

impl DuplicateCheck {
    /// The "no signal" result (empty history or nothing matched).
    #[must_use]
    pub fn none() -> Self {
        Self {
            is_duplicate: false,
            duplicate_score: 0.0,
            same_amount: false,
            same_date: false,
            same_description: false,
            matched_transaction_id: None,
        }
    }
}

// ============================================================================
// Threshold Monitoring
// ============================================================================

/// A spending limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitWindow {
    /// Single-transaction limit.
    PerTransaction,
    /// Rolling daily limit.
    Daily,
    /// Rolling monthly limit.
    Monthly,
    /// Rolling annual limit.
    Annual,
}

impl LimitWindow {
    /// Returns the window name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LimitWindow::PerTransaction => "per_transaction",
            LimitWindow::Daily => "daily",
            LimitWindow::Monthly => "monthly",
            LimitWindow::Annual => "annual",
        }
    }
}

impl fmt::Display for LimitWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending position against the applicable threshold configuration.
///
/// Percentages are `spent / limit` per active window; windows without a
/// configured limit stay at 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStatus {
    /// Category the thresholds apply to.
    pub category_code: String,
    /// At least one window reached or passed its limit.
    pub has_exceeded: bool,
    /// At least one window passed the warning ratio without exceeding.
    pub has_warning: bool,
    /// Current amount relative to the per-transaction limit.
    pub per_transaction_percentage: f64,
    /// Daily spend (including current) relative to the daily limit.
    pub daily_percentage: f64,
    /// Monthly spend (including current) relative to the monthly limit.
    pub monthly_percentage: f64,
    /// Annual spend (including current) relative to the annual limit.
    pub annual_percentage: f64,
    /// Warning ratio from the applied configuration.
    pub warning_threshold: f64,
    /// The window that triggered `has_exceeded`, else the one that warned.
    pub limit_type: Option<LimitWindow>,
}

// ============================================================================
// Anomaly Detection
// ============================================================================

/// Statistical outlier score for a transaction amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScore {
    /// True when the amount deviates beyond the configured threshold.
    pub is_anomaly: bool,
    /// Deviation magnitude scaled to [0, 1].
    pub score: f64,
    /// Human-readable explanation for the audit trail.
    pub reason: String,
}

impl AnomalyScore {
    /// The "no signal" result with an explanation.
    #[must_use]
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            is_anomaly: false,
            score: 0.0,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Velocity Checking
// ============================================================================

/// Transaction-rate comparison between a recent window and a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityCheck {
    /// True when acceleration exceeds the configured multiplier.
    pub is_spike: bool,
    /// Transactions per day over the current window (including this one).
    pub current_rate: f64,
    /// Transactions per day over the baseline window.
    pub historical_rate: f64,
    /// `current_rate / historical_rate`; 0.0 when the baseline is empty.
    pub acceleration_rate: f64,
}

impl VelocityCheck {
    /// The "no spike" result for sparse or empty baselines.
    #[must_use]
    pub fn none(current_rate: f64, historical_rate: f64) -> Self {
        Self {
            is_spike: false,
            current_rate,
            historical_rate,
            acceleration_rate: 0.0,
        }
    }
}

// ============================================================================
// Pattern Analysis
// ============================================================================

/// Aggregate behavioral signals over the whole transaction set.
///
/// Ratios are plain fractions in [0, 1]; the acceleration rate is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCheck {
    /// Fraction of amounts that are exact multiples of a whole currency unit.
    pub round_amount_ratio: f64,
    /// Fraction attributable to the single most frequent merchant.
    pub merchant_concentration: f64,
    /// Fraction falling on Saturday or Sunday.
    pub weekend_transaction_ratio: f64,
    /// Density spike inside the final days of the year.
    pub year_end_spike: bool,
    /// Density spike inside the final days of a month.
    pub end_of_month_spike: bool,
    /// The larger of the month-end and year-end density ratios.
    pub acceleration_rate: f64,
    /// Size of the analyzed set (history + current).
    pub transactions_analyzed: usize,
}

impl PatternCheck {
    /// The "no signal" result for an empty set.
    #[must_use]
    pub fn none() -> Self {
        Self {
            round_amount_ratio: 0.0,
            merchant_concentration: 0.0,
            weekend_transaction_ratio: 0.0,
            year_end_spike: false,
            end_of_month_spike: false,
            acceleration_rate: 0.0,
            transactions_analyzed: 0,
        }
    }
}
