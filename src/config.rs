// ⚙️ Import Configuration - Thresholds and rate limits as data
// Loaded from a JSON file; every field has a default, so `{}` is a valid
// config.

use crate::clock::SystemClock;
use crate::deduplication::DuplicateExpenseDetector;
use crate::entities::ClientMatcher;
use crate::error::ImportError;
use crate::matching::{validate_threshold_percent, DEFAULT_THRESHOLD_PERCENT};
use crate::rate_limit::{RateLimitPolicy, RateLimiter, DEFAULT_SWEEP_INTERVAL};
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint names used by the import workflow
pub const PDF_IMPORT_ENDPOINT: &str = "pdf-import";
pub const TRANSLATE_ENDPOINT: &str = "translate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub limit: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Client match threshold, % of the candidate name length
    pub client_threshold_percent: usize,

    /// Supplier similarity threshold, % of the shorter supplier name
    pub supplier_threshold_percent: usize,

    /// Seconds between lazy sweeps of expired rate limit entries
    pub sweep_interval_secs: u64,

    /// Rate limit per endpoint name
    pub rate_limits: BTreeMap<String, PolicyConfig>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let mut rate_limits = BTreeMap::new();
        rate_limits.insert(
            PDF_IMPORT_ENDPOINT.to_string(),
            PolicyConfig { limit: 10, window_ms: 60_000 },
        );
        rate_limits.insert(
            TRANSLATE_ENDPOINT.to_string(),
            PolicyConfig { limit: 30, window_ms: 60_000 },
        );

        ImportConfig {
            client_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            supplier_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
            rate_limits,
        }
    }
}

impl ImportConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ImportConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a component useless
    pub fn validate(&self) -> std::result::Result<(), ImportError> {
        validate_threshold_percent(self.client_threshold_percent, "client")?;
        validate_threshold_percent(self.supplier_threshold_percent, "supplier")?;
        if self.sweep_interval_secs == 0 {
            return Err(ImportError::InvalidPolicy(
                "sweep interval must be at least 1s".to_string(),
            ));
        }
        for policy in self.rate_limits.values() {
            RateLimitPolicy::new(policy.limit, policy.window_ms)?;
        }
        Ok(())
    }

    /// Rate limit policy for an endpoint
    ///
    /// `Ok(None)` means the endpoint is not throttled. A configured but
    /// invalid policy is an error, never silently unthrottled.
    pub fn policy(&self, endpoint: &str) -> std::result::Result<Option<RateLimitPolicy>, ImportError> {
        self.rate_limits
            .get(endpoint)
            .map(|p| RateLimitPolicy::new(p.limit, p.window_ms))
            .transpose()
    }

    pub fn client_matcher(&self) -> ClientMatcher {
        ClientMatcher {
            threshold_percent: self.client_threshold_percent,
        }
    }

    pub fn duplicate_detector(&self) -> DuplicateExpenseDetector {
        DuplicateExpenseDetector {
            supplier_threshold_percent: self.supplier_threshold_percent,
        }
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::with_clock(
            Arc::new(SystemClock),
            Duration::from_secs(self.sweep_interval_secs),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
