//! Alert, evidence, and check-result types.

use chrono::{DateTime, Utc};
use ledgerguard_core::types::{AlertKind, RecommendedAction, Severity, SignalKind};
use ledgerguard_detect::types::{
    AnomalyScore, DuplicateCheck, PatternCheck, ThresholdStatus, VelocityCheck,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Evidence
// ============================================================================

/// A single piece of evidence backing an alert.
///
/// Every alert carries at least one evidence item; the observed value and the
/// threshold it tripped make the decision reproducible in an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudEvidence {
    /// Detection signal the evidence came from.
    pub signal: SignalKind,
    /// What was observed, in words.
    pub detail: String,
    /// The observed value.
    pub observed: f64,
    /// The threshold the observed value was compared against.
    pub threshold: f64,
    /// Historical transactions implicated by this evidence.
    pub related_transactions: Vec<Uuid>,
}

// ============================================================================
// Alerts
// ============================================================================

/// Review state of an alert.
///
/// The engine always emits `Pending`; transitions happen in the review
/// workflow outside this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Awaiting review.
    Pending,
    /// Picked up by a reviewer.
    InReview,
    /// Confirmed as fraud.
    Confirmed,
    /// Dismissed as a false positive.
    Dismissed,
}

impl AlertStatus {
    /// Returns the status name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "PENDING",
            AlertStatus::InReview => "IN_REVIEW",
            AlertStatus::Confirmed => "CONFIRMED",
            AlertStatus::Dismissed => "DISMISSED",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fraud alert generated from one matched rule.
///
/// Created fresh per check and never mutated by the engine afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Alert ID.
    pub id: Uuid,
    /// Alert classification.
    pub kind: AlertKind,
    /// Severity of the matched rule.
    pub severity: Severity,
    /// Transaction the alert refers to.
    pub transaction_id: Uuid,
    /// Claimant organization.
    pub org_id: Uuid,
    /// Short human-readable title.
    pub title: String,
    /// Generated description with the concrete numbers.
    pub description: String,
    /// Evidence backing the alert (never empty).
    pub evidence: Vec<FraudEvidence>,
    /// Review state; always `Pending` when emitted.
    pub status: AlertStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Action the engine recommends for this alert's severity.
    pub recommended_action: RecommendedAction,
    /// True when the review layer may close the alert without a human.
    pub auto_resolved: bool,
}

// ============================================================================
// Check Result
// ============================================================================

/// Complete result of checking one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudCheckResult {
    /// Transaction that was checked.
    pub transaction_id: Uuid,
    /// True when any alert was generated.
    pub has_fraud_signals: bool,
    /// Duplicate detection output.
    pub duplicate_check: DuplicateCheck,
    /// Threshold monitoring output; `None` when no threshold applies.
    pub threshold_status: Option<ThresholdStatus>,
    /// Anomaly detection output.
    pub anomaly_score: AnomalyScore,
    /// Velocity check output.
    pub velocity_check: VelocityCheck,
    /// Pattern analysis output.
    pub pattern_check: PatternCheck,
    /// Generated alerts, most severe first.
    pub alerts: Vec<FraudAlert>,
    /// The engine's single disposition for this transaction.
    pub recommended_action: RecommendedAction,
    /// True iff `recommended_action` is `Block`.
    pub blocked_by_system: bool,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
    /// Audit trail: id of every detector invoked, signal or not.
    pub checks_performed: Vec<String>,
}

impl FraudCheckResult {
    /// Highest severity across the generated alerts, `Info` when none.
    #[must_use]
    pub fn highest_alert_severity(&self) -> Severity {
        self.alerts
            .iter()
            .map(|alert| alert.severity)
            .max()
            .unwrap_or(Severity::Info)
    }
}
