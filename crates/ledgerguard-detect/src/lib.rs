//! # LedgerGuard Detect
//!
//! The five independent detection signals of the LedgerGuard engine:
//! - `DuplicateDetector` - exact/fuzzy duplicate matching against history
//! - `ThresholdMonitor` - spending limits per category and time window
//! - `AnomalyDetector` - statistical amount outlier detection
//! - `VelocityChecker` - transaction-rate spike detection
//! - `PatternAnalyzer` - aggregate behavioral pattern analysis
//!
//! Every detector is a pure, stateless function of its inputs: no shared
//! mutable state, no I/O, no clock access. Missing optional data (category,
//! merchant) and sparse history degrade to "no signal", never to an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod anomaly;
pub mod duplicate;
pub mod pattern;
pub mod threshold;
pub mod types;
pub mod velocity;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::anomaly::AnomalyDetector;
    pub use crate::duplicate::DuplicateDetector;
    pub use crate::pattern::PatternAnalyzer;
    pub use crate::threshold::ThresholdMonitor;
    pub use crate::types::*;
    pub use crate::velocity::VelocityChecker;
}

pub use anomaly::AnomalyDetector;
pub use duplicate::DuplicateDetector;
pub use pattern::PatternAnalyzer;
pub use threshold::ThresholdMonitor;
pub use types::{
    AnomalyScore, DuplicateCheck, LimitWindow, PatternCheck, ThresholdStatus, VelocityCheck,
};
pub use velocity::VelocityChecker;
