//! Shared domain types for fraud analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Transaction Types
// ============================================================================

/// A financial transaction (expense/claim) for fraud analysis.
///
/// Immutable input supplied by the caller; the engine never mutates it.
/// Amounts are integer minor units (cents) to keep money arithmetic exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: Uuid,
    /// Claimant organization ID.
    pub org_id: Uuid,
    /// Amount in minor units (e.g. cents).
    pub amount: i64,
    /// ISO 4217 currency code (e.g. "EUR").
    pub currency: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Optional expense category code (e.g. "OFFICE_SUPPLIES").
    pub category_code: Option<String>,
    /// Optional merchant name.
    pub merchant_name: Option<String>,
}

impl Transaction {
    /// Create a transaction with the required fields.
    #[must_use]
    pub fn new(
        org_id: Uuid,
        amount: i64,
        currency: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            amount,
            currency: currency.into(),
            date,
            description: description.into(),
            category_code: None,
            merchant_name: None,
        }
    }

    /// Set the expense category code.
    #[must_use]
    pub fn with_category(mut self, category_code: impl Into<String>) -> Self {
        self.category_code = Some(category_code.into());
        self
    }

    /// Set the merchant name.
    #[must_use]
    pub fn with_merchant(mut self, merchant_name: impl Into<String>) -> Self {
        self.merchant_name = Some(merchant_name.into());
        self
    }
}

// ============================================================================
// Severity and Disposition
// ============================================================================

/// Alert severity.
///
/// Severities form a strict total order: `Critical > High > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational signal.
    Info,
    /// Suspicious, worth surfacing.
    Warning,
    /// Strong signal, warrants human review.
    High,
    /// Certain enough to block automatically.
    Critical,
}

impl Severity {
    /// Returns the severity name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The engine's single output disposition per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecommendedAction {
    /// Allow the transaction.
    Allow,
    /// Allow, but surface a warning.
    Warn,
    /// Hold for human review.
    Review,
    /// Block the transaction.
    Block,
}

impl RecommendedAction {
    /// Returns the action name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::Allow => "ALLOW",
            RecommendedAction::Warn => "WARN",
            RecommendedAction::Review => "REVIEW",
            RecommendedAction::Block => "BLOCK",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Signal and Alert Classification
// ============================================================================

/// Detection signal produced by one of the engine's detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SignalKind {
    /// Exact/fuzzy duplicate matching against history.
    Duplicate,
    /// Configured spending-limit monitoring.
    Threshold,
    /// Statistical amount outlier detection.
    Anomaly,
    /// Transaction-velocity spike detection.
    Velocity,
    /// Aggregate behavioral pattern analysis.
    Pattern,
    /// Combined output of all detection signals (the orchestrator).
    Composite,
}

impl SignalKind {
    /// The detection signals the engine runs, in order (excludes `Composite`).
    pub const ALL: &'static [SignalKind] = &[
        SignalKind::Duplicate,
        SignalKind::Threshold,
        SignalKind::Anomaly,
        SignalKind::Velocity,
        SignalKind::Pattern,
    ];

    /// Returns the signal name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Duplicate => "duplicate",
            SignalKind::Threshold => "threshold",
            SignalKind::Anomaly => "anomaly",
            SignalKind::Velocity => "velocity",
            SignalKind::Pattern => "pattern",
            SignalKind::Composite => "composite",
        }
    }

    /// Parse a signal kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "duplicate" => Some(SignalKind::Duplicate),
            "threshold" => Some(SignalKind::Threshold),
            "anomaly" => Some(SignalKind::Anomaly),
            "velocity" => Some(SignalKind::Velocity),
            "pattern" => Some(SignalKind::Pattern),
            "composite" => Some(SignalKind::Composite),
            _ => None,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a generated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AlertKind {
    /// Possible duplicate of a prior transaction.
    DuplicateCharge,
    /// A configured spending limit was breached or approached.
    ThresholdBreach,
    /// Amount statistically unusual for the claimant's category history.
    UnusualAmount,
    /// Abnormal increase in transaction frequency.
    VelocitySpike,
    /// Suspicious aggregate spending pattern.
    SpendingPattern,
    /// Single transaction above the absolute ceiling.
    LargeTransaction,
}

impl AlertKind {
    /// Returns the alert kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertKind::DuplicateCharge => "duplicate_charge",
            AlertKind::ThresholdBreach => "threshold_breach",
            AlertKind::UnusualAmount => "unusual_amount",
            AlertKind::VelocitySpike => "velocity_spike",
            AlertKind::SpendingPattern => "spending_pattern",
            AlertKind::LargeTransaction => "large_transaction",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
