//! Benchmark configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options recognized by the cell comparator and orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Collapse internal whitespace runs before the normalized comparison.
    pub normalize_whitespace: bool,

    /// Lower-case both sides in the normalized comparison.
    pub case_insensitive: bool,

    /// Absolute and relative threshold for numeric cell equality.
    pub numeric_tolerance: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            case_insensitive: false,
            numeric_tolerance: 0.001,
        }
    }
}

impl BenchmarkConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any value is invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.numeric_tolerance.is_finite() || self.numeric_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "numeric_tolerance must be a finite value >= 0, got {}",
                self.numeric_tolerance
            )));
        }
        Ok(())
    }
}
