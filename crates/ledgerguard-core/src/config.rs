//! Engine configuration and spending threshold tables.
//!
//! Every threshold here directly affects financial/compliance outcomes, so
//! configuration is an explicit struct with documented defaults rather than a
//! loosely-typed options bag. Environment overrides use the `LEDGERGUARD_`
//! prefix.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Country code used for the built-in fallback threshold table.
pub const DEFAULT_COUNTRY: &str = "*";

// ============================================================================
// Engine Configuration
// ============================================================================

/// Tunable thresholds for the fraud detection engine.
///
/// Defaults are conservative: they are biased toward surfacing a signal for
/// human review rather than suppressing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudPreventionConfig {
    /// Duplicate score floor for `is_duplicate = true`.
    pub duplicate_score_threshold: f64,
    /// Duplicate score that forces CRITICAL severity.
    pub auto_block_duplicate_score: f64,
    /// Deviation multiple (in standard deviations) that flags an anomaly.
    pub anomaly_std_deviation_threshold: f64,
    /// Minimum same-category history points before the anomaly flag may fire.
    pub anomaly_min_samples: usize,
    /// Acceleration multiple that flags a velocity spike.
    pub velocity_increase_threshold: f64,
    /// Trailing window (days) for the current transaction rate.
    pub velocity_current_window_days: u32,
    /// Trailing window (days) for the baseline transaction rate.
    pub velocity_baseline_window_days: u32,
    /// Minimum baseline transactions before the spike flag may fire.
    pub velocity_min_baseline_count: usize,
    /// Absolute amount (minor units) forcing REVIEW regardless of other signals.
    pub require_review_above: i64,
    /// Category codes that always warrant REVIEW.
    pub require_review_for_categories: Vec<String>,
    /// Round-amount ratio floor for the pattern rule.
    pub round_amount_threshold: f64,
    /// Weekend ratio floor for the pattern rule.
    pub weekend_ratio_threshold: f64,
    /// Merchant concentration floor for the pattern rule.
    pub merchant_concentration_threshold: f64,
    /// Window (days) defining "end of month" for spike detection.
    pub end_of_month_days: u32,
    /// Window (days) defining "end of year" for spike detection.
    pub year_end_days: u32,
}

impl Default for FraudPreventionConfig {
    fn default() -> Self {
        Self {
            duplicate_score_threshold: 0.60,
            auto_block_duplicate_score: 0.95,
            anomaly_std_deviation_threshold: 2.0,
            anomaly_min_samples: 5,
            velocity_increase_threshold: 1.5,
            velocity_current_window_days: 7,
            velocity_baseline_window_days: 30,
            velocity_min_baseline_count: 5,
            require_review_above: 500_000,
            require_review_for_categories: Vec::new(),
            round_amount_threshold: 0.5,
            weekend_ratio_threshold: 0.4,
            merchant_concentration_threshold: 0.8,
            end_of_month_days: 5,
            year_end_days: 30,
        }
    }
}

impl FraudPreventionConfig {
    /// Create a configuration with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate score floor.
    #[must_use]
    pub fn with_duplicate_score_threshold(mut self, threshold: f64) -> Self {
        self.duplicate_score_threshold = threshold;
        self
    }

    /// Set the duplicate score that forces CRITICAL severity.
    #[must_use]
    pub fn with_auto_block_duplicate_score(mut self, score: f64) -> Self {
        self.auto_block_duplicate_score = score;
        self
    }

    /// Set the anomaly deviation threshold (in standard deviations).
    #[must_use]
    pub fn with_anomaly_std_deviation_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_std_deviation_threshold = threshold;
        self
    }

    /// Set the velocity acceleration threshold.
    #[must_use]
    pub fn with_velocity_increase_threshold(mut self, threshold: f64) -> Self {
        self.velocity_increase_threshold = threshold;
        self
    }

    /// Set the absolute review ceiling (minor units).
    #[must_use]
    pub fn with_require_review_above(mut self, amount: i64) -> Self {
        self.require_review_above = amount;
        self
    }

    /// Add a category code that always warrants review.
    #[must_use]
    pub fn with_review_category(mut self, category_code: impl Into<String>) -> Self {
        self.require_review_for_categories.push(category_code.into());
        self
    }

    /// Load defaults with `LEDGERGUARD_*` environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ConfigError` when a set variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<f64>("LEDGERGUARD_DUPLICATE_SCORE_THRESHOLD")? {
            config.duplicate_score_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("LEDGERGUARD_AUTO_BLOCK_DUPLICATE_SCORE")? {
            config.auto_block_duplicate_score = v;
        }
        if let Some(v) = env_parse::<f64>("LEDGERGUARD_ANOMALY_STD_DEVIATION_THRESHOLD")? {
            config.anomaly_std_deviation_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("LEDGERGUARD_VELOCITY_INCREASE_THRESHOLD")? {
            config.velocity_increase_threshold = v;
        }
        if let Some(v) = env_parse::<i64>("LEDGERGUARD_REQUIRE_REVIEW_ABOVE")? {
            config.require_review_above = v;
        }
        if let Ok(csv) = std::env::var("LEDGERGUARD_REQUIRE_REVIEW_FOR_CATEGORIES") {
            config.require_review_for_categories = csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate threshold ranges.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ConfigError` when a ratio falls outside [0, 1]
    /// or a window/sample size is zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("duplicate_score_threshold", self.duplicate_score_threshold),
            ("auto_block_duplicate_score", self.auto_block_duplicate_score),
            ("round_amount_threshold", self.round_amount_threshold),
            ("weekend_ratio_threshold", self.weekend_ratio_threshold),
            (
                "merchant_concentration_threshold",
                self.merchant_concentration_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.velocity_current_window_days == 0
            || self.velocity_baseline_window_days < self.velocity_current_window_days
        {
            return Err(EngineError::config(
                "velocity baseline window must cover the current window",
            ));
        }
        if self.anomaly_min_samples == 0 {
            return Err(EngineError::config("anomaly_min_samples must be positive"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            EngineError::config(format!("{key} holds an unparseable value: {raw:?}"))
        }),
        Err(_) => Ok(None),
    }
}

// ============================================================================
// Spending Thresholds
// ============================================================================

/// Per-country, per-category spending limits.
///
/// All limits are minor units; `None` disables the corresponding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Country code this config applies to (`"*"` for the built-in fallback).
    pub country_code: String,
    /// Expense category code.
    pub category_code: String,
    /// Limit for a single transaction.
    pub per_transaction_limit: Option<i64>,
    /// Rolling daily limit.
    pub daily_limit: Option<i64>,
    /// Rolling monthly limit.
    pub monthly_limit: Option<i64>,
    /// Rolling annual limit.
    pub annual_limit: Option<i64>,
    /// Fraction of a limit at which a warning is raised (0..1).
    pub warning_threshold: f64,
}

impl ThresholdConfig {
    /// Create a threshold config with no limits and the default warning ratio.
    #[must_use]
    pub fn new(country_code: impl Into<String>, category_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            category_code: category_code.into(),
            per_transaction_limit: None,
            daily_limit: None,
            monthly_limit: None,
            annual_limit: None,
            warning_threshold: 0.8,
        }
    }

    /// Set the per-transaction limit.
    #[must_use]
    pub fn with_per_transaction_limit(mut self, limit: i64) -> Self {
        self.per_transaction_limit = Some(limit);
        self
    }

    /// Set the daily limit.
    #[must_use]
    pub fn with_daily_limit(mut self, limit: i64) -> Self {
        self.daily_limit = Some(limit);
        self
    }

    /// Set the monthly limit.
    #[must_use]
    pub fn with_monthly_limit(mut self, limit: i64) -> Self {
        self.monthly_limit = Some(limit);
        self
    }

    /// Set the annual limit.
    #[must_use]
    pub fn with_annual_limit(mut self, limit: i64) -> Self {
        self.annual_limit = Some(limit);
        self
    }

    /// Set the warning ratio.
    #[must_use]
    pub fn with_warning_threshold(mut self, ratio: f64) -> Self {
        self.warning_threshold = ratio;
        self
    }
}

/// Lookup table of spending thresholds keyed by country and category.
///
/// Resolution falls back to the built-in `"*"` table when a country has no
/// explicit configuration; categories absent from both produce no threshold
/// status at all (not applicable, not an error).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdTable {
    configs: HashMap<(String, String), ThresholdConfig>,
}

impl ThresholdTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The conservative built-in default table.
    ///
    /// Used for any country without explicit configuration. Amounts are EUR
    /// minor units.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for config in [
            ThresholdConfig::new(DEFAULT_COUNTRY, "OFFICE_SUPPLIES")
                .with_per_transaction_limit(80_000)
                .with_daily_limit(150_000)
                .with_monthly_limit(400_000)
                .with_annual_limit(2_400_000),
            ThresholdConfig::new(DEFAULT_COUNTRY, "TRAVEL")
                .with_per_transaction_limit(250_000)
                .with_monthly_limit(800_000)
                .with_annual_limit(4_800_000),
            ThresholdConfig::new(DEFAULT_COUNTRY, "MEALS")
                .with_per_transaction_limit(15_000)
                .with_daily_limit(30_000)
                .with_monthly_limit(200_000),
            ThresholdConfig::new(DEFAULT_COUNTRY, "ENTERTAINMENT")
                .with_per_transaction_limit(50_000)
                .with_monthly_limit(150_000)
                .with_annual_limit(900_000),
            ThresholdConfig::new(DEFAULT_COUNTRY, "EQUIPMENT")
                .with_per_transaction_limit(300_000)
                .with_monthly_limit(600_000)
                .with_annual_limit(3_600_000),
            ThresholdConfig::new(DEFAULT_COUNTRY, "SOFTWARE")
                .with_per_transaction_limit(100_000)
                .with_monthly_limit(300_000)
                .with_annual_limit(1_800_000),
        ] {
            table.insert(config);
        }
        table
    }

    /// Insert (or replace) a threshold config.
    pub fn insert(&mut self, config: ThresholdConfig) {
        self.configs.insert(
            (config.country_code.clone(), config.category_code.clone()),
            config,
        );
    }

    /// Insert a threshold config, builder style.
    #[must_use]
    pub fn with_config(mut self, config: ThresholdConfig) -> Self {
        self.insert(config);
        self
    }

    /// Resolve the threshold config for a country/category pair.
    ///
    /// Falls back to the `"*"` table when the country has no entry for the
    /// category; returns `None` when neither table covers it.
    #[must_use]
    pub fn resolve(&self, country_code: &str, category_code: &str) -> Option<&ThresholdConfig> {
        self.configs
            .get(&(country_code.to_string(), category_code.to_string()))
            .or_else(|| {
                self.configs
                    .get(&(DEFAULT_COUNTRY.to_string(), category_code.to_string()))
            })
    }

    /// Number of configured (country, category) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Returns true if no thresholds are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
