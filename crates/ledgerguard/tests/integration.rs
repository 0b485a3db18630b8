//! Integration tests for LedgerGuard
//!
//! These tests exercise the full engine across crates: detector outputs,
//! rule evaluation, disposition invariants, and the execution boundary.

use chrono::NaiveDate;
use ledgerguard::prelude::*;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_catalog_covers_all_detectors() {
    let signals = ledgerguard::catalog::signals();
    assert_eq!(signals.len(), 5, "Should have 5 detection signals");

    let ids: Vec<&str> = signals.iter().map(|s| s.detector_id).collect();
    assert!(ids.contains(&"detect/duplicate"));
    assert!(ids.contains(&"detect/threshold"));
    assert!(ids.contains(&"detect/anomaly"));
    assert!(ids.contains(&"detect/velocity"));
    assert!(ids.contains(&"detect/pattern"));
}

#[test]
fn test_checks_performed_matches_catalog() {
    let engine = FraudDetector::default();
    let tx = Transaction::new(Uuid::new_v4(), 1_000, "EUR", date(2025, 5, 14), "coffee");

    let result = engine.check_transaction(&tx, &[], "DE");

    let catalog_ids: Vec<&str> = ledgerguard::catalog::signals()
        .iter()
        .map(|s| s.detector_id)
        .collect();
    assert_eq!(result.checks_performed, catalog_ids);
}

// ============================================================================
// Disposition Invariants
// ============================================================================

/// blocked_by_system == (action == Block) == at least one CRITICAL alert,
/// across a spread of scenarios.
#[test]
fn test_block_invariant_holds_across_scenarios() {
    init_tracing();
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let prior =
        Transaction::new(claimant, 12_000, "EUR", date(2025, 5, 14), "team lunch");

    let scenarios: Vec<(Vec<Transaction>, Transaction)> = vec![
        // clean
        (
            Vec::new(),
            Transaction::new(claimant, 900, "EUR", date(2025, 5, 14), "coffee"),
        ),
        // exact duplicate
        (
            vec![prior.clone()],
            Transaction::new(claimant, 12_000, "EUR", date(2025, 5, 14), "team lunch"),
        ),
        // large amount, no history
        (
            Vec::new(),
            Transaction::new(claimant, 100_001, "EUR", date(2025, 5, 14), "booth"),
        ),
        // over the review ceiling
        (
            Vec::new(),
            Transaction::new(claimant, 750_000, "EUR", date(2025, 5, 14), "fit-out"),
        ),
        // over the per-transaction category limit
        (
            Vec::new(),
            Transaction::new(claimant, 85_000, "EUR", date(2025, 5, 14), "chairs")
                .with_category("OFFICE_SUPPLIES"),
        ),
    ];

    for (history, tx) in scenarios {
        let result = engine.check_transaction(&tx, &history, "DE");
        let has_critical = result
            .alerts
            .iter()
            .any(|a| a.severity == Severity::Critical);

        assert_eq!(
            result.blocked_by_system,
            result.recommended_action == RecommendedAction::Block,
            "blocked_by_system out of sync for {:?}",
            tx.description
        );
        assert_eq!(
            result.recommended_action == RecommendedAction::Block,
            has_critical,
            "BLOCK without CRITICAL (or vice versa) for {:?}",
            tx.description
        );
        assert_eq!(result.has_fraud_signals, !result.alerts.is_empty());
        assert!((0.0..=1.0).contains(&result.duplicate_check.duplicate_score));
    }
}

#[test]
fn test_every_alert_carries_evidence_and_pending_status() {
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let prior = Transaction::new(claimant, 85_000, "EUR", date(2025, 5, 14), "chairs")
        .with_category("OFFICE_SUPPLIES");
    let tx = Transaction::new(claimant, 85_000, "EUR", date(2025, 5, 14), "chairs")
        .with_category("OFFICE_SUPPLIES");

    let result = engine.check_transaction(&tx, &[prior], "DE");

    assert!(result.alerts.len() >= 2, "expected duplicate + threshold alerts");
    for alert in &result.alerts {
        assert!(!alert.evidence.is_empty());
        assert_eq!(alert.status, AlertStatus::Pending);
        assert_eq!(alert.transaction_id, tx.id);
        assert_eq!(alert.org_id, claimant);
    }
    // Sorted most severe first.
    for pair in result.alerts.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }
}

// ============================================================================
// Pattern Workflows
// ============================================================================

#[test]
fn test_round_amount_history_raises_pattern_warning() {
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();

    // Eight of thirteen amounts are whole currency units, spread mid-month so
    // neither period-end window clusters.
    let mut history = Vec::new();
    for d in 1..=7 {
        history.push(Transaction::new(
            claimant,
            d as i64 * 1_000,
            "EUR",
            date(2025, 5, d),
            format!("supply run {d}"),
        ));
    }
    for d in 8..=12 {
        history.push(Transaction::new(
            claimant,
            1_234 + d as i64,
            "EUR",
            date(2025, 5, d),
            format!("receipt {d}"),
        ));
    }
    let tx = Transaction::new(claimant, 3_000, "EUR", date(2025, 5, 20), "stationery");

    let result = engine.check_transaction(&tx, &history, "DE");

    assert!(result.pattern_check.round_amount_ratio > 0.5);
    let pattern_alert = result
        .alerts
        .iter()
        .find(|a| a.kind == AlertKind::SpendingPattern)
        .expect("round-amount pattern alert");
    assert_eq!(pattern_alert.severity, Severity::Warning);
    assert_eq!(result.recommended_action, RecommendedAction::Warn);
}

#[test]
fn test_small_sets_do_not_raise_pattern_alerts() {
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    // Three round weekend amounts: every ratio is extreme, the set is tiny.
    let history = vec![
        Transaction::new(claimant, 5_000, "EUR", date(2025, 5, 3), "a"),
        Transaction::new(claimant, 6_000, "EUR", date(2025, 5, 4), "b"),
    ];
    let tx = Transaction::new(claimant, 7_000, "EUR", date(2025, 5, 10), "c");

    let result = engine.check_transaction(&tx, &history, "DE");

    assert!(result
        .alerts
        .iter()
        .all(|a| a.kind != AlertKind::SpendingPattern));
}

// ============================================================================
// Batch Workflows
// ============================================================================

#[test]
fn test_batch_rolls_history_forward() {
    init_tracing();
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let txs: Vec<Transaction> = (0..3)
        .map(|_| Transaction::new(claimant, 4_400, "EUR", date(2025, 5, 14), "parking"))
        .collect();

    let results = engine.check_batch(&txs, &[], "DE");

    assert!(!results[0].duplicate_check.is_duplicate);
    assert!(results[1].duplicate_check.is_duplicate);
    assert!(results[2].duplicate_check.is_duplicate);
    assert!(results[1].duplicate_check.duplicate_score >= 0.95);
    assert!(results[1].blocked_by_system);
    assert_eq!(
        results[1].duplicate_check.matched_transaction_id,
        Some(txs[0].id)
    );
}

#[test]
fn test_batch_respects_caller_history() {
    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let prior = Transaction::new(claimant, 4_400, "EUR", date(2025, 5, 14), "parking");
    let txs = vec![Transaction::new(
        claimant,
        4_400,
        "EUR",
        date(2025, 5, 14),
        "parking",
    )];

    let results = engine.check_batch(&txs, &[prior], "DE");

    assert!(results[0].duplicate_check.is_duplicate);
}

// ============================================================================
// Execution Boundary
// ============================================================================

#[tokio::test]
async fn test_execute_and_serialize_roundtrip() {
    use ledgerguard::core::detector::BatchCheck;

    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let tx = Transaction::new(claimant, 100_001, "EUR", date(2025, 5, 14), "booth");
    let input = TransactionCheckInput::new(tx, Vec::new(), "DE");

    let output = engine.execute(input).await.unwrap();
    assert!(output.result.has_fraud_signals);

    // The whole result must survive the serde boundary unchanged.
    let json = serde_json::to_string(&output.result).unwrap();
    let back: FraudCheckResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, output.result);
}

#[tokio::test]
async fn test_execute_with_timeout_completes() {
    use ledgerguard::core::detector::BatchCheck;
    use std::time::Duration;

    let engine = FraudDetector::default();
    let claimant = Uuid::new_v4();
    let txs: Vec<Transaction> = (0..20)
        .map(|i| {
            Transaction::new(
                claimant,
                1_000 + i,
                "EUR",
                date(2025, 5, 14),
                format!("receipt {i}"),
            )
        })
        .collect();
    let input = BatchCheckInput::new(txs, Vec::new(), "DE");

    let output = engine
        .execute_with_timeout(input, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(output.results.len(), 20);
}

// ============================================================================
// Configuration Effects
// ============================================================================

#[test]
fn test_custom_threshold_table_changes_disposition() {
    let strict = ThresholdTable::new().with_config(
        ThresholdConfig::new("DE", "MEALS").with_per_transaction_limit(2_000),
    );
    let engine = FraudDetector::new(FraudPreventionConfig::default(), strict);
    let tx = Transaction::new(Uuid::new_v4(), 2_500, "EUR", date(2025, 5, 14), "lunch")
        .with_category("MEALS");

    let result = engine.check_transaction(&tx, &[], "DE");
    assert!(result.blocked_by_system);

    // The default table allows the same transaction.
    let lenient = FraudDetector::default();
    let result = lenient.check_transaction(&tx, &[], "DE");
    assert!(!result.blocked_by_system);
}

#[test]
fn test_unknown_category_yields_no_threshold_status() {
    let engine = FraudDetector::default();
    let tx = Transaction::new(Uuid::new_v4(), 9_000, "EUR", date(2025, 5, 14), "misc")
        .with_category("UNMAPPED_CATEGORY");

    let result = engine.check_transaction(&tx, &[], "DE");

    assert!(result.threshold_status.is_none());
    assert_eq!(result.recommended_action, RecommendedAction::Allow);
}
