//! Detector metadata and trait definitions.
//!
//! Every detection component carries a `DetectorMetadata` describing what it
//! is, and the orchestrator records each detector it invoked (by metadata id)
//! in the audit trail of the check result.

use crate::error::{EngineError, Result};
use crate::types::SignalKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// Metadata describing a detection component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorMetadata {
    /// Unique detector identifier (e.g. "detect/duplicate").
    pub id: String,
    /// Detection signal this component produces.
    pub signal: SignalKind,
    /// Human-readable description.
    pub description: String,
    /// Version of the detector implementation.
    pub version: u32,
}

impl DetectorMetadata {
    /// Create new detector metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, signal: SignalKind) -> Self {
        Self {
            id: id.into(),
            signal,
            description: String::new(),
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// Base trait for all detection components.
///
/// Detectors are stateless: they hold metadata and nothing else, and every
/// `compute` is a pure function of its inputs. This makes them trivially safe
/// to invoke in parallel and to test in isolation.
pub trait Detector: Send + Sync + Debug {
    /// Returns the detector metadata.
    fn metadata(&self) -> &DetectorMetadata;

    /// Returns the detector ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }

    /// Returns the signal this detector produces.
    fn signal(&self) -> SignalKind {
        self.metadata().signal
    }
}

/// Trait for components executable at the service-dispatch boundary.
///
/// The detection pipeline is pure synchronous computation; this trait is the
/// seam that lets callers dispatch serde-typed check requests, optionally
/// under a deadline.
///
/// # Type Parameters
///
/// - `I`: Input type
/// - `O`: Output type
#[async_trait]
pub trait BatchCheck<I, O>: Detector
where
    I: Send + Sync,
    O: Send + Sync,
{
    /// Execute the check with the given input.
    async fn execute(&self, input: I) -> Result<O>;

    /// Validate the input before execution.
    ///
    /// Override to provide custom input validation.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }

    /// Execute the check with a deadline.
    async fn execute_with_timeout(&self, input: I, timeout: Duration) -> Result<O>
    where
        I: 'async_trait,
    {
        match tokio::time::timeout(timeout, self.execute(input)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(EngineError::Timeout(timeout)),
        }
    }
}
