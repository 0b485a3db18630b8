//! The fraud detection orchestrator.
//!
//! Runs the five detectors over a transaction and its history, evaluates the
//! rule table on the combined outputs, and produces a `FraudCheckResult` with
//! alerts, a single recommended disposition, and a full audit trail of the
//! checks performed.

use crate::alert::{AlertStatus, FraudAlert, FraudCheckResult};
use crate::rules::{evaluate, standard_rules, FraudRule, RuleContext, RuleMatch};
use chrono::Utc;
use ledgerguard_core::config::{FraudPreventionConfig, ThresholdTable};
use ledgerguard_core::detector::{Detector, DetectorMetadata};
use ledgerguard_core::types::{RecommendedAction, Severity, SignalKind, Transaction};
use ledgerguard_detect::{
    AnomalyDetector, DuplicateDetector, PatternAnalyzer, ThresholdMonitor, VelocityChecker,
};
use std::collections::HashMap;
use uuid::Uuid;

/// The fraud detection engine.
///
/// Holds the configuration, the threshold table, and the rule table fixed at
/// construction; every check is a pure function of those plus the supplied
/// transaction and history, so identical inputs produce identical results
/// (timestamps and alert ids aside).
#[derive(Debug)]
pub struct FraudDetector {
    metadata: DetectorMetadata,
    config: FraudPreventionConfig,
    thresholds: ThresholdTable,
    rules: Vec<FraudRule>,
    duplicate: DuplicateDetector,
    threshold: ThresholdMonitor,
    anomaly: AnomalyDetector,
    velocity: VelocityChecker,
    pattern: PatternAnalyzer,
}

impl Default for FraudDetector {
    fn default() -> Self {
        Self::new(FraudPreventionConfig::default(), ThresholdTable::builtin())
    }
}

impl FraudDetector {
    /// Create an engine with the given configuration and threshold table.
    #[must_use]
    pub fn new(config: FraudPreventionConfig, thresholds: ThresholdTable) -> Self {
        let rules = standard_rules();
        tracing::info!(
            rules = rules.len(),
            thresholds = thresholds.len(),
            "fraud detection engine initialized"
        );
        Self {
            metadata: DetectorMetadata::new("engine/fraud-check", SignalKind::Composite)
                .with_description("Five-signal fraud check with declarative rule table"),
            config,
            thresholds,
            rules,
            duplicate: DuplicateDetector::new(),
            threshold: ThresholdMonitor::new(),
            anomaly: AnomalyDetector::new(),
            velocity: VelocityChecker::new(),
            pattern: PatternAnalyzer::new(),
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &FraudPreventionConfig {
        &self.config
    }

    /// Check a single transaction against the claimant's history.
    ///
    /// `history` must belong to the same claimant organization; the engine
    /// never crosses tenant boundaries on its own.
    pub fn check_transaction(
        &self,
        transaction: &Transaction,
        history: &[Transaction],
        country_code: &str,
    ) -> FraudCheckResult {
        let duplicate = DuplicateDetector::compute(transaction, history, &self.config);
        let threshold_status = transaction
            .category_code
            .as_deref()
            .and_then(|category| self.thresholds.resolve(country_code, category))
            .map(|config| ThresholdMonitor::compute(transaction, config, history));
        let anomaly = AnomalyDetector::compute(transaction, history, &self.config);
        let velocity = VelocityChecker::compute(transaction.date, history, &self.config);
        let pattern = PatternAnalyzer::compute(transaction, history, &self.config);

        let ctx = RuleContext {
            transaction,
            duplicate: &duplicate,
            threshold: threshold_status.as_ref(),
            anomaly: &anomaly,
            velocity: &velocity,
            pattern: &pattern,
            config: &self.config,
        };
        let matches = evaluate(&self.rules, &ctx);
        let recommended_action = self.decide(transaction, &matches);

        let mut alerts: Vec<FraudAlert> = matches
            .into_iter()
            .map(|matched| self.build_alert(transaction, matched))
            .collect();
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

        tracing::debug!(
            transaction = %transaction.id,
            alerts = alerts.len(),
            action = %recommended_action,
            "transaction checked"
        );

        FraudCheckResult {
            transaction_id: transaction.id,
            has_fraud_signals: !alerts.is_empty(),
            duplicate_check: duplicate,
            threshold_status,
            anomaly_score: anomaly,
            velocity_check: velocity,
            pattern_check: pattern,
            alerts,
            recommended_action,
            blocked_by_system: recommended_action == RecommendedAction::Block,
            checked_at: Utc::now(),
            checks_performed: self.checks_performed(),
        }
    }

    /// Check a batch of one claimant's transactions in submission order.
    ///
    /// Each checked transaction is folded into the rolling history before the
    /// next check, so duplicate detection for transaction *k* sees everything
    /// already processed in this batch. This ordering requirement is why the
    /// batch is sequential; independent claimants can run in parallel.
    pub fn check_batch(
        &self,
        transactions: &[Transaction],
        history: &[Transaction],
        country_code: &str,
    ) -> Vec<FraudCheckResult> {
        let mut rolling: Vec<Transaction> = history.to_vec();
        let mut results = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            results.push(self.check_transaction(transaction, &rolling, country_code));
            rolling.push(transaction.clone());
        }
        results
    }

    /// Check a mixed batch, partitioned by claimant organization.
    ///
    /// Submission order is preserved within each organization; organizations
    /// are independent of each other (histories never cross tenants).
    pub fn check_batch_by_org(
        &self,
        transactions: &[Transaction],
        history_by_org: &HashMap<Uuid, Vec<Transaction>>,
        country_code: &str,
    ) -> HashMap<Uuid, Vec<FraudCheckResult>> {
        let mut batches: HashMap<Uuid, Vec<Transaction>> = HashMap::new();
        for transaction in transactions {
            batches
                .entry(transaction.org_id)
                .or_default()
                .push(transaction.clone());
        }

        batches
            .into_iter()
            .map(|(org_id, batch)| {
                let history = history_by_org
                    .get(&org_id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                (org_id, self.check_batch(&batch, history, country_code))
            })
            .collect()
    }

    /// Disposition precedence, top to bottom, first match wins.
    fn decide(&self, transaction: &Transaction, matches: &[RuleMatch]) -> RecommendedAction {
        let has_critical = matches.iter().any(|m| m.severity == Severity::Critical);
        if has_critical {
            return RecommendedAction::Block;
        }

        let has_high = matches.iter().any(|m| m.severity == Severity::High);
        let above_review_ceiling = transaction.amount > self.config.require_review_above;
        let review_category = transaction.category_code.as_deref().is_some_and(|category| {
            self.config
                .require_review_for_categories
                .iter()
                .any(|c| c.as_str() == category)
        });
        if has_high || above_review_ceiling || review_category {
            return RecommendedAction::Review;
        }

        if !matches.is_empty() {
            return RecommendedAction::Warn;
        }
        RecommendedAction::Allow
    }

    fn build_alert(&self, transaction: &Transaction, matched: RuleMatch) -> FraudAlert {
        FraudAlert {
            id: Uuid::new_v4(),
            kind: matched.kind,
            severity: matched.severity,
            transaction_id: transaction.id,
            org_id: transaction.org_id,
            title: matched.title.to_string(),
            description: matched.description,
            evidence: matched.evidence,
            status: AlertStatus::Pending,
            created_at: Utc::now(),
            recommended_action: action_for_severity(matched.severity),
            auto_resolved: false,
        }
    }

    fn checks_performed(&self) -> Vec<String> {
        [
            self.duplicate.id(),
            self.threshold.id(),
            self.anomaly.id(),
            self.velocity.id(),
            self.pattern.id(),
        ]
        .iter()
        .map(|id| (*id).to_string())
        .collect()
    }
}

impl Detector for FraudDetector {
    fn metadata(&self) -> &DetectorMetadata {
        &self.metadata
    }
}

/// Per-alert recommendation implied by the matched rule's severity.
const fn action_for_severity(severity: Severity) -> RecommendedAction {
    match severity {
        Severity::Critical => RecommendedAction::Block,
        Severity::High => RecommendedAction::Review,
        Severity::Warning | Severity::Info => RecommendedAction::Warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerguard_core::types::AlertKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn org() -> Uuid {
        Uuid::new_v4()
    }

    fn office_supply(org_id: Uuid, amount: i64, date: NaiveDate) -> Transaction {
        Transaction::new(org_id, amount, "EUR", date, "office supplies")
            .with_category("OFFICE_SUPPLIES")
    }

    #[test]
    fn test_clean_transaction_is_allowed() {
        let engine = FraudDetector::default();
        let tx = office_supply(org(), 4_200, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[], "DE");

        assert!(!result.has_fraud_signals);
        assert!(result.alerts.is_empty());
        assert_eq!(result.recommended_action, RecommendedAction::Allow);
        assert!(!result.blocked_by_system);
    }

    #[test]
    fn test_checks_performed_lists_every_detector() {
        let engine = FraudDetector::default();
        let tx = office_supply(org(), 4_200, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[], "DE");

        assert_eq!(
            result.checks_performed,
            vec![
                "detect/duplicate",
                "detect/threshold",
                "detect/anomaly",
                "detect/velocity",
                "detect/pattern"
            ]
        );
    }

    #[test]
    fn test_per_transaction_limit_blocks() {
        // The built-in OFFICE_SUPPLIES per-transaction limit is 80_000.
        let engine = FraudDetector::default();
        let tx = office_supply(org(), 85_000, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[], "DE");

        let status = result.threshold_status.as_ref().unwrap();
        assert!(status.has_exceeded);
        assert_eq!(result.recommended_action, RecommendedAction::Block);
        assert!(result.blocked_by_system);
        assert_eq!(result.alerts[0].severity, Severity::Critical);
        assert_eq!(result.alerts[0].kind, AlertKind::ThresholdBreach);
    }

    #[test]
    fn test_threshold_warning_does_not_block() {
        // 320_000 of the 400_000 monthly limit is exactly the warning ratio.
        let claimant = org();
        let engine = FraudDetector::default();
        let history = vec![office_supply(claimant, 270_000, date(2025, 5, 3))];
        let tx = office_supply(claimant, 50_000, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &history, "DE");

        let status = result.threshold_status.as_ref().unwrap();
        assert!(status.has_warning);
        assert!(!status.has_exceeded);
        assert_eq!(result.recommended_action, RecommendedAction::Warn);
        assert!(!result.blocked_by_system);
    }

    #[test]
    fn test_identical_transaction_blocks_as_duplicate() {
        let claimant = org();
        let engine = FraudDetector::default();
        let prior = office_supply(claimant, 12_000, date(2025, 5, 14));
        let tx = office_supply(claimant, 12_000, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[prior], "DE");

        assert!(result.duplicate_check.is_duplicate);
        assert!(result.duplicate_check.duplicate_score >= 0.95);
        assert_eq!(result.recommended_action, RecommendedAction::Block);
        assert!(result.blocked_by_system);
    }

    #[test]
    fn test_large_amount_warns_with_empty_history() {
        let engine = FraudDetector::default();
        let tx = Transaction::new(org(), 100_001, "EUR", date(2025, 5, 14), "conference booth");

        let result = engine.check_transaction(&tx, &[], "DE");

        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].kind, AlertKind::LargeTransaction);
        assert_eq!(result.alerts[0].severity, Severity::Warning);
        assert_eq!(result.recommended_action, RecommendedAction::Warn);
    }

    #[test]
    fn test_review_ceiling_forces_review() {
        let engine = FraudDetector::default();
        let tx = Transaction::new(org(), 600_000, "EUR", date(2025, 5, 14), "fit-out works");

        let result = engine.check_transaction(&tx, &[], "DE");

        assert_eq!(result.recommended_action, RecommendedAction::Review);
        assert!(!result.blocked_by_system);
    }

    #[test]
    fn test_review_category_forces_review() {
        let config = FraudPreventionConfig::default().with_review_category("GIFTS");
        let engine = FraudDetector::new(config, ThresholdTable::builtin());
        let tx = Transaction::new(org(), 2_000, "EUR", date(2025, 5, 14), "client present")
            .with_category("GIFTS");

        let result = engine.check_transaction(&tx, &[], "DE");

        assert_eq!(result.recommended_action, RecommendedAction::Review);
    }

    #[test]
    fn test_batch_detects_intra_batch_duplicates() {
        let claimant = org();
        let engine = FraudDetector::default();
        let txs: Vec<Transaction> = (0..3)
            .map(|_| Transaction::new(claimant, 7_500, "EUR", date(2025, 5, 14), "parking"))
            .collect();

        let results = engine.check_batch(&txs, &[], "DE");

        assert_eq!(results.len(), 3);
        assert!(!results[0].duplicate_check.is_duplicate);
        assert!(results[1].duplicate_check.is_duplicate);
        assert!(results[2].duplicate_check.is_duplicate);
    }

    #[test]
    fn test_check_is_idempotent() {
        let claimant = org();
        let engine = FraudDetector::default();
        let history = vec![office_supply(claimant, 12_000, date(2025, 5, 14))];
        let tx = office_supply(claimant, 12_000, date(2025, 5, 14));

        let first = engine.check_transaction(&tx, &history, "DE");
        let second = engine.check_transaction(&tx, &history, "DE");

        assert_eq!(first.duplicate_check, second.duplicate_check);
        assert_eq!(first.threshold_status, second.threshold_status);
        assert_eq!(first.anomaly_score, second.anomaly_score);
        assert_eq!(first.velocity_check, second.velocity_check);
        assert_eq!(first.pattern_check, second.pattern_check);
        assert_eq!(first.recommended_action, second.recommended_action);
        assert_eq!(first.alerts.len(), second.alerts.len());
        for (a, b) in first.alerts.iter().zip(&second.alerts) {
            assert_eq!(a.severity, b.severity);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.description, b.description);
            assert_eq!(a.evidence, b.evidence);
        }
    }

    #[test]
    fn test_alerts_sorted_most_severe_first() {
        let claimant = org();
        let engine = FraudDetector::default();
        // Duplicate of a prior transaction that also breaches the limit.
        let prior = office_supply(claimant, 85_000, date(2025, 5, 14));
        let tx = office_supply(claimant, 85_000, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[prior], "DE");

        assert!(result.alerts.len() >= 2);
        for pair in result.alerts.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_batch_by_org_keeps_tenants_apart() {
        let engine = FraudDetector::default();
        let org_a = org();
        let org_b = org();

        // The same transaction shape in both orgs: a duplicate within A only.
        let txs = vec![
            Transaction::new(org_a, 7_500, "EUR", date(2025, 5, 14), "parking"),
            Transaction::new(org_b, 7_500, "EUR", date(2025, 5, 14), "parking"),
            Transaction::new(org_a, 7_500, "EUR", date(2025, 5, 14), "parking"),
        ];

        let results = engine.check_batch_by_org(&txs, &HashMap::new(), "DE");

        let a = &results[&org_a];
        let b = &results[&org_b];
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert!(!a[0].duplicate_check.is_duplicate);
        assert!(a[1].duplicate_check.is_duplicate);
        assert!(!b[0].duplicate_check.is_duplicate, "history crossed tenants");
    }

    #[test]
    fn test_every_alert_has_evidence() {
        let claimant = org();
        let engine = FraudDetector::default();
        let prior = office_supply(claimant, 85_000, date(2025, 5, 14));
        let tx = office_supply(claimant, 85_000, date(2025, 5, 14));

        let result = engine.check_transaction(&tx, &[prior], "DE");

        assert!(result.has_fraud_signals);
        for alert in &result.alerts {
            assert!(!alert.evidence.is_empty(), "alert {} lacks evidence", alert.title);
            assert_eq!(alert.status, AlertStatus::Pending);
        }
    }
}
