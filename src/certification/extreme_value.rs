//! Running extreme value for a single metric kind
//!
//! An `ExtremeValue` scans violations one at a time and keeps the worst
//! reading seen so far. Each violation that moves the extreme is recorded,
//! so the recorded list is a trace of running extremes in arrival order,
//! not just the final winner.

use super::factor::factor_function;
use super::{CertificationError, CertificationResult};
use crate::models::{MetricKind, SourceLocation, ViolationRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Readings closer than this to the current extreme are treated as ties.
pub const EPSILON: f64 = 0.00001;

/// Which direction counts as "worse" for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Lower readings are worse (e.g. code coverage)
    Min,
    /// Higher readings are worse (e.g. complexity)
    Max,
}

impl Mode {
    /// True when `candidate` beats `current` by more than [`EPSILON`].
    pub fn is_more_extreme(&self, candidate: f64, current: f64) -> bool {
        match self {
            Mode::Max => candidate > current + EPSILON,
            Mode::Min => candidate < current - EPSILON,
        }
    }
}

/// Worst observed value of one metric plus the violations that set it.
#[derive(Debug, Clone)]
pub struct ExtremeValue {
    kind: MetricKind,
    mode: Mode,
    value: f64,
    threshold: f64,
    violations: Vec<ViolationRecord>,
}

impl ExtremeValue {
    /// Create a tracker for `kind`. `None` or `0` selects the built-in
    /// default threshold.
    ///
    /// The threshold seeds the current value, so a stream without any
    /// qualifying violation yields the baseline factor.
    pub fn new(kind: MetricKind, threshold: Option<f64>) -> CertificationResult<Self> {
        let threshold = threshold
            .filter(|t| *t != 0.0)
            .unwrap_or_else(|| kind.default_threshold());
        validate_threshold(kind, threshold)?;
        Ok(Self::seeded(kind, threshold))
    }

    /// Tracker using the built-in default threshold.
    pub fn with_default_threshold(kind: MetricKind) -> Self {
        Self::seeded(kind, kind.default_threshold())
    }

    fn seeded(kind: MetricKind, threshold: f64) -> Self {
        Self {
            kind,
            mode: kind.mode(),
            value: threshold,
            threshold,
            violations: Vec::new(),
        }
    }

    /// Feed one violation. Returns `true` if it became the new extreme.
    ///
    /// Violations without a usable metric value are ignored.
    pub fn update(&mut self, violation: &ViolationRecord) -> bool {
        let Some(metric) = violation.metric_value() else {
            return false;
        };
        if !self.mode.is_more_extreme(metric, self.value) {
            return false;
        }

        debug!(
            "{}: new extreme {} (was {}) at {}",
            self.kind, metric, self.value, violation.location
        );
        self.value = metric;
        self.violations.push(violation.clone());
        true
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Violations that moved the extreme, in arrival order.
    pub fn violations(&self) -> &[ViolationRecord] {
        &self.violations
    }

    /// Source locations of the recorded violations.
    pub fn locations(&self) -> Vec<SourceLocation> {
        self.violations.iter().map(|v| v.location.clone()).collect()
    }

    /// Certification cost multiplier for the current extreme.
    pub fn factor(&self) -> f64 {
        factor_function(self.kind, self.threshold).factor(self.value)
    }
}

fn validate_threshold(kind: MetricKind, threshold: f64) -> CertificationResult<()> {
    let invalid = |reason: &str| CertificationError::InvalidThreshold {
        metric: kind,
        reason: reason.to_string(),
    };

    if !threshold.is_finite() {
        return Err(invalid("threshold must be a finite number"));
    }
    if threshold < 0.0 {
        return Err(invalid("threshold must not be negative"));
    }
    match kind {
        MetricKind::Coverage if threshold > 100.0 => {
            Err(invalid("coverage threshold is a percentage (0-100)"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(rule: &str, metric: f64, line: u32) -> ViolationRecord {
        ViolationRecord::new(rule, metric, SourceLocation::new("src/Foo.php", line))
    }

    #[test]
    fn test_seeded_with_threshold() {
        let ev = ExtremeValue::new(MetricKind::CrapIndex, None).unwrap();
        assert_eq!(ev.threshold(), 30.0);
        assert_eq!(ev.value(), 30.0);
        assert_eq!(ev.mode(), Mode::Max);
        assert!(ev.violations().is_empty());
    }

    #[test]
    fn test_max_mode_keeps_running_maximum() {
        let mut ev = ExtremeValue::new(MetricKind::CrapIndex, None).unwrap();
        assert!(ev.update(&violation("CrapIndex", 40.0, 1)));
        assert!(!ev.update(&violation("CrapIndex", 35.0, 2)));
        assert!(ev.update(&violation("CrapIndex", 50.0, 3)));
        assert!(!ev.update(&violation("CrapIndex", 10.0, 4)));

        assert_eq!(ev.value(), 50.0);
        let lines: Vec<u32> = ev.violations().iter().map(|v| v.location.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_min_mode_keeps_running_minimum() {
        let mut ev = ExtremeValue::new(MetricKind::Coverage, Some(80.0)).unwrap();
        assert_eq!(ev.mode(), Mode::Min);
        assert!(ev.update(&violation("Coverage", 60.0, 10)));
        assert!(!ev.update(&violation("Coverage", 75.0, 11)));
        assert!(ev.update(&violation("Coverage", 12.5, 12)));

        assert_eq!(ev.value(), 12.5);
        assert_eq!(ev.violations().len(), 2);
    }

    #[test]
    fn test_values_below_threshold_do_not_move() {
        let mut ev = ExtremeValue::new(MetricKind::CyclomaticComplexity, Some(10.0)).unwrap();
        for v in [1.0, 5.0, 9.0, 10.0] {
            assert!(!ev.update(&violation("CyclomaticComplexity", v, 1)));
        }
        assert_eq!(ev.value(), 10.0);
        assert!(ev.violations().is_empty());
    }

    #[test]
    fn test_epsilon_ties_are_not_changes() {
        let mut ev = ExtremeValue::new(MetricKind::CrapIndex, None).unwrap();
        assert!(ev.update(&violation("CrapIndex", 42.0, 1)));
        assert!(!ev.update(&violation("CrapIndex", 42.000001, 2)));
        assert!(!ev.update(&violation("CrapIndex", 42.0, 3)));
        assert_eq!(ev.violations().len(), 1);

        assert!(ev.update(&violation("CrapIndex", 42.001, 4)));
        assert_eq!(ev.violations().len(), 2);
    }

    #[test]
    fn test_repeated_update_is_idempotent() {
        let mut ev = ExtremeValue::new(MetricKind::NpathComplexity, None).unwrap();
        let v = violation("NpathComplexity", 800.0, 7);
        assert!(ev.update(&v));
        assert!(!ev.update(&v));
        assert!(!ev.update(&v));
        assert_eq!(ev.value(), 800.0);
        assert_eq!(ev.violations().len(), 1);
    }

    #[test]
    fn test_malformed_metric_is_skipped() {
        let mut ev = ExtremeValue::new(MetricKind::CrapIndex, None).unwrap();
        let mut missing = violation("CrapIndex", 0.0, 1);
        missing.metric = None;
        let nan = violation("CrapIndex", f64::NAN, 2);
        assert!(!ev.update(&missing));
        assert!(!ev.update(&nan));
        assert!(ev.update(&violation("CrapIndex", 31.0, 3)));
        assert_eq!(ev.value(), 31.0);
    }

    #[test]
    fn test_locations_follow_recorded_violations() {
        let mut ev = ExtremeValue::new(MetricKind::CrapIndex, None).unwrap();
        ev.update(&violation("CrapIndex", 45.0, 20));
        ev.update(&violation("CrapIndex", 60.0, 99));
        assert_eq!(
            ev.locations(),
            vec![
                SourceLocation::new("src/Foo.php", 20),
                SourceLocation::new("src/Foo.php", 99)
            ]
        );
    }

    #[test]
    fn test_invalid_thresholds_fail_fast() {
        assert!(ExtremeValue::new(MetricKind::CrapIndex, Some(f64::NAN)).is_err());
        assert!(ExtremeValue::new(MetricKind::CrapIndex, Some(-1.0)).is_err());
        assert!(ExtremeValue::new(MetricKind::Coverage, Some(120.0)).is_err());
    }

    #[test]
    fn test_zero_threshold_selects_default() {
        let mut ccn = ExtremeValue::new(MetricKind::CyclomaticComplexity, Some(0.0)).unwrap();
        assert_eq!(ccn.threshold(), 4.0);
        ccn.update(&violation("CyclomaticComplexity", 50.0, 1));
        assert_eq!(ccn.factor(), 47.0);

        let npath = ExtremeValue::new(MetricKind::NpathComplexity, Some(0.0)).unwrap();
        assert_eq!(npath.threshold(), 200.0);
        assert_eq!(npath.factor(), 1.0);
    }
}
