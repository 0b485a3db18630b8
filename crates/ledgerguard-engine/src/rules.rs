//! The declarative fraud rule table and its evaluator.
//!
//! Rules are data, not control flow: a fixed, ordered list of records, each
//! with a pure predicate over the combined detector outputs, a severity, and
//! generators for the human-readable description and the supporting evidence.
//! One generic evaluator walks the table; rules are independent and every
//! match is kept.

use crate::alert::FraudEvidence;
use ledgerguard_core::config::FraudPreventionConfig;
use ledgerguard_core::types::{AlertKind, Severity, SignalKind, Transaction};
use ledgerguard_detect::types::{
    AnomalyScore, DuplicateCheck, PatternCheck, ThresholdStatus, VelocityCheck,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Fixed absolute ceiling (minor units) for the large-transaction rule.
pub const LARGE_AMOUNT_CEILING: i64 = 100_000;
/// Duplicate score at which severity escalates to HIGH.
const DUPLICATE_HIGH_SCORE: f64 = 0.75;
/// Anomaly score above which severity escalates to HIGH.
const ANOMALY_HIGH_SCORE: f64 = 0.8;
/// Acceleration above which a velocity spike escalates to HIGH.
const VELOCITY_HIGH_ACCELERATION: f64 = 2.5;
/// Acceleration floor for the year-end spike rule.
const YEAR_END_ACCELERATION: f64 = 2.0;
/// Acceleration floor for the month-end spike rule.
const MONTH_END_ACCELERATION: f64 = 1.8;
/// Minimum analyzed transactions before set-wide pattern rules may fire.
const MIN_PATTERN_SAMPLE: usize = 10;

// ============================================================================
// Rule Context
// ============================================================================

/// Shared evaluation context: the raw transaction, the five detector
/// outputs, and the engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The transaction under check.
    pub transaction: &'a Transaction,
    /// Duplicate detection output.
    pub duplicate: &'a DuplicateCheck,
    /// Threshold monitoring output, when a threshold applied.
    pub threshold: Option<&'a ThresholdStatus>,
    /// Anomaly detection output.
    pub anomaly: &'a AnomalyScore,
    /// Velocity check output.
    pub velocity: &'a VelocityCheck,
    /// Pattern analysis output.
    pub pattern: &'a PatternCheck,
    /// Engine configuration.
    pub config: &'a FraudPreventionConfig,
}

// ============================================================================
// Rule Table
// ============================================================================

/// A single declarative fraud rule.
#[derive(Debug, Clone)]
pub struct FraudRule {
    /// Stable rule name for the audit trail.
    pub name: &'static str,
    /// Alert classification for matches.
    pub kind: AlertKind,
    /// Severity assigned to matches.
    pub severity: Severity,
    /// Short alert title.
    pub title: &'static str,
    /// Pure predicate over the evaluation context.
    pub condition: fn(&RuleContext<'_>) -> bool,
    /// Description generator with the concrete numbers.
    pub describe: fn(&RuleContext<'_>) -> String,
    /// Evidence generator; must return at least one item for a match.
    pub evidence: fn(&RuleContext<'_>) -> Vec<FraudEvidence>,
}

/// A rule that matched, with its generated description and evidence.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    /// Name of the matched rule.
    pub name: &'static str,
    /// Alert classification.
    pub kind: AlertKind,
    /// Severity of the match.
    pub severity: Severity,
    /// Alert title.
    pub title: &'static str,
    /// Generated description.
    pub description: String,
    /// Generated evidence.
    pub evidence: Vec<FraudEvidence>,
}

/// The engine's standard rule table, in evaluation order.
///
/// Order does not affect correctness (all matches are kept); it fixes the
/// order matches are reported in before severity sorting.
#[must_use]
pub fn standard_rules() -> Vec<FraudRule> {
    vec![
        FraudRule {
            name: "duplicate_critical",
            kind: AlertKind::DuplicateCharge,
            severity: Severity::Critical,
            title: "Near-exact duplicate of a prior transaction",
            condition: |ctx| ctx.duplicate.duplicate_score >= ctx.config.auto_block_duplicate_score,
            describe: |ctx| {
                format!(
                    "Transaction matches a prior transaction with score {:.2} (auto-block floor {:.2})",
                    ctx.duplicate.duplicate_score, ctx.config.auto_block_duplicate_score
                )
            },
            evidence: |ctx| duplicate_evidence(ctx, ctx.config.auto_block_duplicate_score),
        },
        FraudRule {
            name: "duplicate_high",
            kind: AlertKind::DuplicateCharge,
            severity: Severity::High,
            title: "Strong duplicate candidate",
            condition: |ctx| {
                ctx.duplicate.duplicate_score >= DUPLICATE_HIGH_SCORE
                    && ctx.duplicate.duplicate_score < ctx.config.auto_block_duplicate_score
            },
            describe: |ctx| {
                format!(
                    "Transaction closely matches a prior transaction (score {:.2})",
                    ctx.duplicate.duplicate_score
                )
            },
            evidence: |ctx| duplicate_evidence(ctx, DUPLICATE_HIGH_SCORE),
        },
        FraudRule {
            name: "duplicate_warning",
            kind: AlertKind::DuplicateCharge,
            severity: Severity::Warning,
            title: "Possible duplicate transaction",
            condition: |ctx| {
                ctx.duplicate.is_duplicate
                    && ctx.duplicate.duplicate_score < DUPLICATE_HIGH_SCORE
            },
            describe: |ctx| {
                format!(
                    "Transaction resembles a prior transaction (score {:.2})",
                    ctx.duplicate.duplicate_score
                )
            },
            evidence: |ctx| duplicate_evidence(ctx, ctx.config.duplicate_score_threshold),
        },
        FraudRule {
            name: "threshold_exceeded",
            kind: AlertKind::ThresholdBreach,
            severity: Severity::Critical,
            title: "Spending limit exceeded",
            condition: |ctx| ctx.threshold.is_some_and(|t| t.has_exceeded),
            describe: |ctx| match ctx.threshold {
                Some(t) => format!(
                    "Category {} exceeded its {} limit ({:.0}% used)",
                    t.category_code,
                    t.limit_type.map_or("spending", |w| w.as_str()),
                    max_window_percentage(t) * 100.0
                ),
                None => String::from("Spending limit exceeded"),
            },
            evidence: |ctx| threshold_evidence(ctx, 1.0),
        },
        FraudRule {
            name: "threshold_warning",
            kind: AlertKind::ThresholdBreach,
            severity: Severity::Warning,
            title: "Approaching spending limit",
            condition: |ctx| ctx.threshold.is_some_and(|t| t.has_warning && !t.has_exceeded),
            describe: |ctx| match ctx.threshold {
                Some(t) => format!(
                    "Category {} is at {:.0}% of its {} limit",
                    t.category_code,
                    max_window_percentage(t) * 100.0,
                    t.limit_type.map_or("spending", |w| w.as_str()),
                ),
                None => String::from("Approaching spending limit"),
            },
            evidence: |ctx| {
                threshold_evidence(ctx, ctx.threshold.map_or(1.0, |t| t.warning_threshold))
            },
        },
        FraudRule {
            name: "anomaly_high",
            kind: AlertKind::UnusualAmount,
            severity: Severity::High,
            title: "Amount far outside claimant's usual range",
            condition: |ctx| ctx.anomaly.is_anomaly && ctx.anomaly.score > ANOMALY_HIGH_SCORE,
            describe: |ctx| ctx.anomaly.reason.clone(),
            evidence: |ctx| anomaly_evidence(ctx),
        },
        FraudRule {
            name: "anomaly_info",
            kind: AlertKind::UnusualAmount,
            severity: Severity::Info,
            title: "Amount unusual for claimant",
            condition: |ctx| ctx.anomaly.is_anomaly && ctx.anomaly.score <= ANOMALY_HIGH_SCORE,
            describe: |ctx| ctx.anomaly.reason.clone(),
            evidence: |ctx| anomaly_evidence(ctx),
        },
        FraudRule {
            name: "velocity_high",
            kind: AlertKind::VelocitySpike,
            severity: Severity::High,
            title: "Sharp transaction-rate spike",
            condition: |ctx| ctx.velocity.acceleration_rate > VELOCITY_HIGH_ACCELERATION,
            describe: |ctx| velocity_description(ctx),
            evidence: |ctx| velocity_evidence(ctx, VELOCITY_HIGH_ACCELERATION),
        },
        FraudRule {
            name: "velocity_warning",
            kind: AlertKind::VelocitySpike,
            severity: Severity::Warning,
            title: "Elevated transaction rate",
            condition: |ctx| {
                ctx.velocity.is_spike
                    && ctx.velocity.acceleration_rate <= VELOCITY_HIGH_ACCELERATION
            },
            describe: |ctx| velocity_description(ctx),
            evidence: |ctx| velocity_evidence(ctx, ctx.config.velocity_increase_threshold),
        },
        FraudRule {
            name: "round_amount_pattern",
            kind: AlertKind::SpendingPattern,
            severity: Severity::Warning,
            title: "Unusually many round amounts",
            condition: |ctx| {
                ctx.pattern.transactions_analyzed >= MIN_PATTERN_SAMPLE
                    && ctx.pattern.round_amount_ratio > ctx.config.round_amount_threshold
            },
            describe: |ctx| {
                format!(
                    "{:.0}% of {} transactions are whole-unit amounts",
                    ctx.pattern.round_amount_ratio * 100.0,
                    ctx.pattern.transactions_analyzed
                )
            },
            evidence: |ctx| {
                pattern_evidence(
                    "round-amount ratio",
                    ctx.pattern.round_amount_ratio,
                    ctx.config.round_amount_threshold,
                )
            },
        },
        FraudRule {
            name: "year_end_spike",
            kind: AlertKind::SpendingPattern,
            severity: Severity::High,
            title: "Year-end spending spike",
            condition: |ctx| {
                ctx.pattern.year_end_spike
                    && ctx.pattern.acceleration_rate > YEAR_END_ACCELERATION
            },
            describe: |ctx| {
                format!(
                    "Transaction density in the final {} days of the year is {:.1}x the claimant's typical density",
                    ctx.config.year_end_days, ctx.pattern.acceleration_rate
                )
            },
            evidence: |ctx| {
                pattern_evidence(
                    "year-end density ratio",
                    ctx.pattern.acceleration_rate,
                    YEAR_END_ACCELERATION,
                )
            },
        },
        FraudRule {
            name: "month_end_spike",
            kind: AlertKind::SpendingPattern,
            severity: Severity::Warning,
            title: "Month-end spending spike",
            condition: |ctx| {
                ctx.pattern.end_of_month_spike
                    && ctx.pattern.acceleration_rate > MONTH_END_ACCELERATION
            },
            describe: |ctx| {
                format!(
                    "Transaction density in the final {} days of the month is {:.1}x the claimant's typical density",
                    ctx.config.end_of_month_days, ctx.pattern.acceleration_rate
                )
            },
            evidence: |ctx| {
                pattern_evidence(
                    "month-end density ratio",
                    ctx.pattern.acceleration_rate,
                    MONTH_END_ACCELERATION,
                )
            },
        },
        FraudRule {
            name: "merchant_concentration",
            kind: AlertKind::SpendingPattern,
            severity: Severity::Warning,
            title: "Spending concentrated on one merchant",
            condition: |ctx| {
                ctx.pattern.transactions_analyzed >= MIN_PATTERN_SAMPLE
                    && ctx.pattern.merchant_concentration
                        > ctx.config.merchant_concentration_threshold
            },
            describe: |ctx| {
                format!(
                    "{:.0}% of {} transactions go to a single merchant",
                    ctx.pattern.merchant_concentration * 100.0,
                    ctx.pattern.transactions_analyzed
                )
            },
            evidence: |ctx| {
                pattern_evidence(
                    "merchant concentration",
                    ctx.pattern.merchant_concentration,
                    ctx.config.merchant_concentration_threshold,
                )
            },
        },
        FraudRule {
            name: "weekend_pattern",
            kind: AlertKind::SpendingPattern,
            severity: Severity::Info,
            title: "Weekend-heavy spending",
            condition: |ctx| {
                ctx.pattern.transactions_analyzed >= MIN_PATTERN_SAMPLE
                    && ctx.pattern.weekend_transaction_ratio > ctx.config.weekend_ratio_threshold
            },
            describe: |ctx| {
                format!(
                    "{:.0}% of {} transactions fall on weekends",
                    ctx.pattern.weekend_transaction_ratio * 100.0,
                    ctx.pattern.transactions_analyzed
                )
            },
            evidence: |ctx| {
                pattern_evidence(
                    "weekend ratio",
                    ctx.pattern.weekend_transaction_ratio,
                    ctx.config.weekend_ratio_threshold,
                )
            },
        },
        FraudRule {
            name: "large_transaction",
            kind: AlertKind::LargeTransaction,
            severity: Severity::Warning,
            title: "Large single transaction",
            condition: |ctx| ctx.transaction.amount > LARGE_AMOUNT_CEILING,
            describe: |ctx| {
                format!(
                    "Amount {} {} is above the {} minor-unit ceiling",
                    ctx.transaction.amount, ctx.transaction.currency, LARGE_AMOUNT_CEILING
                )
            },
            evidence: |ctx| {
                vec![FraudEvidence {
                    signal: SignalKind::Composite,
                    detail: String::from("single-transaction amount ceiling"),
                    observed: ctx.transaction.amount as f64,
                    threshold: LARGE_AMOUNT_CEILING as f64,
                    related_transactions: Vec::new(),
                }]
            },
        },
    ]
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate the rule table against a context, keeping every match.
///
/// Each rule is evaluated in isolation: a panic inside a condition or a
/// generator is caught, logged, and treated as "rule did not match", so one
/// faulty rule can never abort its siblings.
#[must_use]
pub fn evaluate(rules: &[FraudRule], ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
    let mut matches = Vec::new();
    for rule in rules {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            if (rule.condition)(ctx) {
                Some(((rule.describe)(ctx), (rule.evidence)(ctx)))
            } else {
                None
            }
        }));
        match outcome {
            Ok(Some((description, evidence))) => {
                tracing::debug!(rule = rule.name, severity = %rule.severity, "rule matched");
                matches.push(RuleMatch {
                    name: rule.name,
                    kind: rule.kind,
                    severity: rule.severity,
                    title: rule.title,
                    description,
                    evidence,
                });
            }
            Ok(None) => {}
            Err(_) => {
                tracing::warn!(rule = rule.name, "rule evaluation panicked; treated as unmatched");
            }
        }
    }
    matches
}

/// Highest severity across the matches; `Info` for an empty list.
#[must_use]
pub fn highest_severity(matches: &[RuleMatch]) -> Severity {
    matches
        .iter()
        .map(|m| m.severity)
        .max()
        .unwrap_or(Severity::Info)
}

// ============================================================================
// Evidence Builders
// ============================================================================

fn duplicate_evidence(ctx: &RuleContext<'_>, threshold: f64) -> Vec<FraudEvidence> {
    let mut matched_on = Vec::new();
    if ctx.duplicate.same_amount {
        matched_on.push("amount");
    }
    if ctx.duplicate.same_date {
        matched_on.push("date");
    }
    if ctx.duplicate.same_description {
        matched_on.push("description");
    }
    vec![FraudEvidence {
        signal: SignalKind::Duplicate,
        detail: format!("closest historical match on {}", matched_on.join(", ")),
        observed: ctx.duplicate.duplicate_score,
        threshold,
        related_transactions: ctx.duplicate.matched_transaction_id.into_iter().collect(),
    }]
}

fn threshold_evidence(ctx: &RuleContext<'_>, threshold: f64) -> Vec<FraudEvidence> {
    let Some(status) = ctx.threshold else {
        return Vec::new();
    };
    vec![FraudEvidence {
        signal: SignalKind::Threshold,
        detail: format!(
            "category {} {} window utilization",
            status.category_code,
            status.limit_type.map_or("spending", |w| w.as_str()),
        ),
        observed: max_window_percentage(status),
        threshold,
        related_transactions: Vec::new(),
    }]
}

fn anomaly_evidence(ctx: &RuleContext<'_>) -> Vec<FraudEvidence> {
    vec![FraudEvidence {
        signal: SignalKind::Anomaly,
        detail: ctx.anomaly.reason.clone(),
        observed: ctx.anomaly.score,
        threshold: ANOMALY_HIGH_SCORE,
        related_transactions: Vec::new(),
    }]
}

fn velocity_description(ctx: &RuleContext<'_>) -> String {
    format!(
        "Transaction rate {:.2}/day is {:.1}x the baseline {:.2}/day",
        ctx.velocity.current_rate, ctx.velocity.acceleration_rate, ctx.velocity.historical_rate
    )
}

fn velocity_evidence(ctx: &RuleContext<'_>, threshold: f64) -> Vec<FraudEvidence> {
    vec![FraudEvidence {
        signal: SignalKind::Velocity,
        detail: String::from("trailing-window acceleration over baseline"),
        observed: ctx.velocity.acceleration_rate,
        threshold,
        related_transactions: Vec::new(),
    }]
}

fn pattern_evidence(detail: &str, observed: f64, threshold: f64) -> Vec<FraudEvidence> {
    vec![FraudEvidence {
        signal: SignalKind::Pattern,
        detail: detail.to_string(),
        observed,
        threshold,
        related_transactions: Vec::new(),
    }]
}

fn max_window_percentage(status: &ThresholdStatus) -> f64 {
    status
        .per_transaction_percentage
        .max(status.daily_percentage)
        .max(status.monthly_percentage)
        .max(status.annual_percentage)
}
