//! # LedgerGuard Engine
//!
//! The orchestration layer of the LedgerGuard fraud detection engine:
//! - `rules` - the declarative rule table and its fault-isolated evaluator
//! - `alert` - alert, evidence, and check-result types
//! - `engine` - the `FraudDetector` orchestrator (`check_transaction`,
//!   `check_batch`, `check_batch_by_org`)
//! - `messages` - serde envelopes for the async execution boundary
//!
//! The engine combines five independent detection signals through a fixed
//! rule table and produces a deterministic, explainable disposition
//! (allow / warn / review / block) with an audit trail of every check
//! performed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alert;
pub mod engine;
pub mod messages;
pub mod rules;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::alert::{AlertStatus, FraudAlert, FraudCheckResult, FraudEvidence};
    pub use crate::engine::FraudDetector;
    pub use crate::messages::{
        BatchCheckInput, BatchCheckOutput, TransactionCheckInput, TransactionCheckOutput,
    };
    pub use crate::rules::{FraudRule, RuleContext, RuleMatch};
}

pub use alert::{AlertStatus, FraudAlert, FraudCheckResult, FraudEvidence};
pub use engine::FraudDetector;
pub use rules::{highest_severity, standard_rules, FraudRule, RuleContext, RuleMatch};
