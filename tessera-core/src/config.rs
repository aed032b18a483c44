//! Runtime configuration
//!
//! A process-wide `RuntimeConfig` holds the numeric tolerances and output
//! conventions the kernels consult. Callers read a copy with [`current`] and
//! replace it with [`install`].

use crate::error::{ModelError, ModelResult};
use crate::format::DEFAULT_SIGNIFICANT_DIGITS;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// How complex values are laid out in CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvComplexStyle {
    /// Two cells per element: `re,im`
    Pairs,
    /// One cell per element: `re+imj`
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Iteration cap for SVD and Schur; 0 iterates until convergence
    pub iteration_limit: usize,
    /// Convergence threshold for SVD and Schur
    pub convergence_epsilon: f64,
    /// Tolerance used by structural predicates when the caller passes a negative one
    pub default_tolerance: f64,
    pub csv_complex_style: CsvComplexStyle,
    /// Digit count above which real renderings are checked for float noise
    pub significant_digits: u32,
}

impl RuntimeConfig {
    pub const fn new() -> Self {
        Self {
            iteration_limit: 0,
            convergence_epsilon: f64::EPSILON,
            default_tolerance: 1e-12,
            csv_complex_style: CsvComplexStyle::Suffix,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
        }
    }

    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = limit;
        self
    }

    pub fn with_convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }

    pub fn with_default_tolerance(mut self, tolerance: f64) -> Self {
        self.default_tolerance = tolerance;
        self
    }

    pub fn with_csv_complex_style(mut self, style: CsvComplexStyle) -> Self {
        self.csv_complex_style = style;
        self
    }

    pub fn with_significant_digits(mut self, digits: u32) -> Self {
        self.significant_digits = digits;
        self
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(text: &str) -> ModelResult<Self> {
        let config: RuntimeConfig = serde_json::from_str(text)
            .map_err(|e| ModelError::parameter("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(self.convergence_epsilon > 0.0) {
            return Err(ModelError::numeric("convergence_epsilon", self.convergence_epsilon));
        }
        if !(self.default_tolerance >= 0.0) {
            return Err(ModelError::numeric("default_tolerance", self.default_tolerance));
        }
        if self.significant_digits == 0 || self.significant_digits > 17 {
            return Err(ModelError::parameter(
                "significant_digits",
                format!("{} is outside 1..=17", self.significant_digits),
            ));
        }
        Ok(())
    }

    /// The tolerance to use for a caller-supplied value
    pub fn tolerance(&self, requested: f64) -> f64 {
        if requested < 0.0 {
            self.default_tolerance
        } else {
            requested
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

static CURRENT: RwLock<RuntimeConfig> = parking_lot::const_rwlock(RuntimeConfig::new());

/// Copy of the active configuration
pub fn current() -> RuntimeConfig {
    *CURRENT.read()
}

/// Replace the active configuration
pub fn install(config: RuntimeConfig) -> ModelResult<()> {
    config.validate()?;
    tracing::debug!(?config, "installing runtime configuration");
    *CURRENT.write() = config;
    Ok(())
}
