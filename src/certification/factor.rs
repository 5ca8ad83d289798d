//! Cost factor functions
//!
//! Each metric kind maps its extreme value to a dimensionless multiplier.
//! Every mapping is continuous, non-decreasing in the severity direction
//! and clamped to a floor of 1, so no metric can push the price below the
//! baseline.
//!
//! # Factors
//!
//! ```text
//! Cyclomatic Complexity   max(1, value - threshold + 1)          threshold 4
//! C.R.A.P. Index          max(1, (value - 20) / 10)              threshold 30
//! NPath Complexity        max(1, 1 + log2(value / threshold))    threshold 200
//! Code Coverage           max(1, 1 + (threshold - value) / 10)   threshold 70
//! ```
//!
//! The NPath and coverage curves are pricing policy: NPath grows
//! exponentially with branching, so each doubling over the threshold adds
//! one, and every ten percentage points of missing coverage add one.

use super::extreme_value::Mode;
use crate::models::MetricKind;

/// Default thresholds as defined in the certification sheet.
pub const DEFAULT_CCN_THRESHOLD: f64 = 4.0;
pub const DEFAULT_CRAP_INDEX_THRESHOLD: f64 = 30.0;
pub const DEFAULT_NPATH_THRESHOLD: f64 = 200.0;
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 70.0;

/// C.R.A.P. index at which the factor starts counting.
const CRAP_INDEX_BASE: f64 = 20.0;
/// C.R.A.P. points per factor step.
const CRAP_INDEX_STEP: f64 = 10.0;
/// Coverage percentage points per factor step.
const COVERAGE_STEP: f64 = 10.0;

/// Maps an extreme value to a certification cost multiplier.
pub trait FactorFunction {
    fn factor(&self, value: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclomaticComplexityFactor {
    pub threshold: f64,
}

impl FactorFunction for CyclomaticComplexityFactor {
    fn factor(&self, value: f64) -> f64 {
        (value - self.threshold + 1.0).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrapIndexFactor;

impl FactorFunction for CrapIndexFactor {
    fn factor(&self, value: f64) -> f64 {
        ((value - CRAP_INDEX_BASE) / CRAP_INDEX_STEP).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpathComplexityFactor {
    pub threshold: f64,
}

impl FactorFunction for NpathComplexityFactor {
    fn factor(&self, value: f64) -> f64 {
        if value <= self.threshold {
            return 1.0;
        }
        (1.0 + (value / self.threshold).log2()).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageFactor {
    pub threshold: f64,
}

impl FactorFunction for CoverageFactor {
    fn factor(&self, value: f64) -> f64 {
        (1.0 + (self.threshold - value) / COVERAGE_STEP).max(1.0)
    }
}

/// Factor function for `kind`, parameterized with the tracker threshold.
pub fn factor_function(kind: MetricKind, threshold: f64) -> Box<dyn FactorFunction> {
    match kind {
        MetricKind::CyclomaticComplexity => Box::new(CyclomaticComplexityFactor { threshold }),
        MetricKind::CrapIndex => Box::new(CrapIndexFactor),
        MetricKind::NpathComplexity => Box::new(NpathComplexityFactor { threshold }),
        MetricKind::Coverage => Box::new(CoverageFactor { threshold }),
    }
}

impl MetricKind {
    /// Direction in which readings get worse.
    pub fn mode(&self) -> Mode {
        match self {
            MetricKind::Coverage => Mode::Min,
            MetricKind::CrapIndex | MetricKind::NpathComplexity | MetricKind::CyclomaticComplexity => {
                Mode::Max
            }
        }
    }

    pub fn default_threshold(&self) -> f64 {
        match self {
            MetricKind::Coverage => DEFAULT_COVERAGE_THRESHOLD,
            MetricKind::CrapIndex => DEFAULT_CRAP_INDEX_THRESHOLD,
            MetricKind::NpathComplexity => DEFAULT_NPATH_THRESHOLD,
            MetricKind::CyclomaticComplexity => DEFAULT_CCN_THRESHOLD,
        }
    }
}
