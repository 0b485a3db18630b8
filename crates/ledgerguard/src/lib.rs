//! # LedgerGuard
//!
//! Fraud & anomaly detection engine for expense and claim transactions.
//!
//! LedgerGuard inspects a transaction against the claimant's history and a
//! set of jurisdiction-specific spending policies, and produces a ranked set
//! of alerts plus a single recommended disposition (allow / warn / review /
//! block). All computation is pure and in-memory: deterministic, explainable,
//! and conservatively biased for a tax-compliance audit trail.
//!
//! ## Detection signals
//!
//! | Signal | Detector | Description |
//! |--------|----------|-------------|
//! | duplicate | `DuplicateDetector` | Fuzzy duplicate matching on amount, date, description |
//! | threshold | `ThresholdMonitor` | Per-category spending limits over calendar windows |
//! | anomaly | `AnomalyDetector` | Z-score amount outliers against category history |
//! | velocity | `VelocityChecker` | Trailing-window transaction rate vs baseline |
//! | pattern | `PatternAnalyzer` | Round amounts, merchant concentration, timing clusters |
//!
//! Signals merge through a fixed, declarative rule table evaluated with
//! per-rule fault isolation; matched rules become alerts with evidence.
//!
//! ## Quick start
//!
//! ```rust
//! use ledgerguard::prelude::*;
//! use chrono::NaiveDate;
//! use uuid::Uuid;
//!
//! let engine = FraudDetector::default();
//! let claimant = Uuid::new_v4();
//! let date = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
//!
//! let prior = Transaction::new(claimant, 12_000, "EUR", date, "team lunch");
//! let duplicate = Transaction::new(claimant, 12_000, "EUR", date, "team lunch");
//!
//! let result = engine.check_transaction(&duplicate, &[prior], "DE");
//! assert!(result.duplicate_check.is_duplicate);
//! assert!(result.blocked_by_system);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export the component crates
pub use ledgerguard_core as core;
pub use ledgerguard_detect as detect;
pub use ledgerguard_engine as engine;

/// Prelude module for convenient imports.
///
/// Import everything you need with:
/// ```rust
/// use ledgerguard::prelude::*;
/// ```
pub mod prelude {
    pub use ledgerguard_core::prelude::*;
    pub use ledgerguard_detect::prelude::*;
    pub use ledgerguard_engine::prelude::*;
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Catalog of the engine's detection signals.
pub mod catalog {
    use ledgerguard_core::types::SignalKind;

    /// Information about one detection signal.
    #[derive(Debug, Clone)]
    pub struct SignalInfo {
        /// Signal enum value.
        pub signal: SignalKind,
        /// Detector ID as recorded in `checks_performed`.
        pub detector_id: &'static str,
        /// Human-readable name.
        pub name: &'static str,
        /// Description.
        pub description: &'static str,
    }

    /// Get all detection signal information.
    pub fn signals() -> Vec<SignalInfo> {
        vec![
            SignalInfo {
                signal: SignalKind::Duplicate,
                detector_id: "detect/duplicate",
                name: "Duplicate Detection",
                description: "Fuzzy duplicate matching on amount, date, and description",
            },
            SignalInfo {
                signal: SignalKind::Threshold,
                detector_id: "detect/threshold",
                name: "Threshold Monitoring",
                description: "Per-category spending limits over calendar windows",
            },
            SignalInfo {
                signal: SignalKind::Anomaly,
                detector_id: "detect/anomaly",
                name: "Anomaly Detection",
                description: "Z-score amount outliers against same-category history",
            },
            SignalInfo {
                signal: SignalKind::Velocity,
                detector_id: "detect/velocity",
                name: "Velocity Checking",
                description: "Trailing-window transaction rate against a baseline",
            },
            SignalInfo {
                signal: SignalKind::Pattern,
                detector_id: "detect/pattern",
                name: "Pattern Analysis",
                description: "Round amounts, merchant concentration, and timing clusters",
            },
        ]
    }

    /// Number of detection signals.
    pub fn signal_count() -> usize {
        signals().len()
    }
}
