//! Input/output envelopes for the async execution boundary.
//!
//! These are the serde-typed messages a service layer dispatches to the
//! engine; each output carries the compute time for latency accounting.

use crate::alert::FraudCheckResult;
use crate::engine::FraudDetector;
use async_trait::async_trait;
use ledgerguard_core::detector::BatchCheck;
use ledgerguard_core::error::{EngineError, Result};
use ledgerguard_core::types::Transaction;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ============================================================================
// Single Check Messages
// ============================================================================

/// Single-transaction check input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCheckInput {
    /// Transaction to check.
    pub transaction: Transaction,
    /// Claimant history, oldest first.
    pub history: Vec<Transaction>,
    /// Country code selecting the threshold table.
    pub country_code: String,
}

impl TransactionCheckInput {
    /// Create a new single-check input.
    pub fn new(
        transaction: Transaction,
        history: Vec<Transaction>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            transaction,
            history,
            country_code: country_code.into(),
        }
    }
}

/// Single-transaction check output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCheckOutput {
    /// The check result.
    pub result: FraudCheckResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Batch Check Messages
// ============================================================================

/// Batch check input for one claimant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCheckInput {
    /// Transactions in submission order.
    pub transactions: Vec<Transaction>,
    /// Claimant history, oldest first.
    pub history: Vec<Transaction>,
    /// Country code selecting the threshold table.
    pub country_code: String,
}

impl BatchCheckInput {
    /// Create a new batch input.
    pub fn new(
        transactions: Vec<Transaction>,
        history: Vec<Transaction>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            transactions,
            history,
            country_code: country_code.into(),
        }
    }
}

/// Batch check output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCheckOutput {
    /// One result per transaction, in submission order.
    pub results: Vec<FraudCheckResult>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Execution Impls
// ============================================================================

#[async_trait]
impl BatchCheck<TransactionCheckInput, TransactionCheckOutput> for FraudDetector {
    async fn execute(&self, input: TransactionCheckInput) -> Result<TransactionCheckOutput> {
        self.validate_input(&input)?;
        let start = Instant::now();
        let result =
            self.check_transaction(&input.transaction, &input.history, &input.country_code);
        Ok(TransactionCheckOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &TransactionCheckInput) -> Result<()> {
        if input.country_code.is_empty() {
            return Err(EngineError::validation("country_code must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl BatchCheck<BatchCheckInput, BatchCheckOutput> for FraudDetector {
    async fn execute(&self, input: BatchCheckInput) -> Result<BatchCheckOutput> {
        self.validate_input(&input)?;
        let start = Instant::now();
        let results = self.check_batch(&input.transactions, &input.history, &input.country_code);
        Ok(BatchCheckOutput {
            results,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &BatchCheckInput) -> Result<()> {
        if input.country_code.is_empty() {
            return Err(EngineError::validation("country_code must not be empty"));
        }
        Ok(())
    }
}
