//! Module certification
//!
//! Derives the certification cost of a module from four extreme values
//! found in the host's violation stream.
//!
//! # Pipeline
//!
//! ```text
//! violations ─► classify(rule) ─► ExtremeValue::update ─► factor ─► product ─► price
//! ```
//!
//! - Each violation is classified by the rule that produced it. Rules
//!   outside the four certification metrics are ignored.
//! - One tracker per metric keeps the running extreme (max for complexity
//!   and C.R.A.P. index, min for coverage).
//! - After the stream is exhausted the four factors are multiplied and
//!   priced as `base_price + factor * unit_cost`.

mod cost;
mod extreme_value;
mod factor;

pub use cost::{
    CertificationCost, FinalReport, MetricReport, DEFAULT_BASE_PRICE, DEFAULT_UNIT_COST,
};
pub use extreme_value::{ExtremeValue, Mode, EPSILON};
pub use factor::{
    factor_function, CoverageFactor, CrapIndexFactor, CyclomaticComplexityFactor,
    FactorFunction, NpathComplexityFactor, DEFAULT_CCN_THRESHOLD, DEFAULT_COVERAGE_THRESHOLD,
    DEFAULT_CRAP_INDEX_THRESHOLD, DEFAULT_NPATH_THRESHOLD,
};

use crate::config::normalize_rule_name;
use crate::models::{MetricKind, ViolationRecord};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while setting up a certification run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CertificationError {
    #[error("Invalid threshold for {metric}: {reason}")]
    InvalidThreshold { metric: MetricKind, reason: String },

    #[error("Invalid pricing: {0}")]
    InvalidPricing(String),

    #[error(
        "Unknown metric '{0}'. Valid metrics: coverage, crap-index, npath-complexity, cyclomatic-complexity"
    )]
    UnknownMetric(String),
}

pub type CertificationResult<T> = Result<T, CertificationError>;

/// Map a rule identifier to the metric it feeds, if any.
///
/// Accepts bare names (`CrapIndex`), namespaced ones
/// (`PHPMD\OXMD\Rule\CrapIndex`) and kebab/snake case keys (`crap-index`).
pub fn classify(rule: &str) -> Option<MetricKind> {
    let name = rule
        .rsplit(['\\', '/', '.', ':'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(rule);

    match normalize_rule_name(name).as_str() {
        "cyclomatic-complexity" | "ccn" | "ccn2" => Some(MetricKind::CyclomaticComplexity),
        "npath-complexity" | "n-path-complexity" | "npath" => Some(MetricKind::NpathComplexity),
        "coverage" | "code-coverage" => Some(MetricKind::Coverage),
        "crap-index" | "crap" => Some(MetricKind::CrapIndex),
        _ => None,
    }
}

/// Parse a metric key as used in config files and `--threshold` flags.
pub fn parse_metric(name: &str) -> CertificationResult<MetricKind> {
    MetricKind::ALL
        .into_iter()
        .find(|kind| kind.key() == normalize_rule_name(name))
        .or_else(|| classify(name))
        .ok_or_else(|| CertificationError::UnknownMetric(name.to_string()))
}

/// Counters for one pass over a violation stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Violations seen
    pub total: usize,
    /// Violations routed to a tracker
    pub classified: usize,
    /// Violations from unrelated rules
    pub ignored: usize,
    /// Classified violations skipped for a missing or non-numeric metric
    pub malformed: usize,
}

/// The four extreme values relevant for a module certification.
#[derive(Debug, Clone)]
pub struct ExtremeValues {
    coverage: ExtremeValue,
    crap_index: ExtremeValue,
    npath: ExtremeValue,
    ccn: ExtremeValue,
    stats: StreamStats,
}

impl Default for ExtremeValues {
    fn default() -> Self {
        Self {
            coverage: ExtremeValue::with_default_threshold(MetricKind::Coverage),
            crap_index: ExtremeValue::with_default_threshold(MetricKind::CrapIndex),
            npath: ExtremeValue::with_default_threshold(MetricKind::NpathComplexity),
            ccn: ExtremeValue::with_default_threshold(MetricKind::CyclomaticComplexity),
            stats: StreamStats::default(),
        }
    }
}

impl ExtremeValues {
    /// Trackers seeded with threshold overrides; missing kinds use defaults.
    pub fn new(thresholds: &BTreeMap<MetricKind, f64>) -> CertificationResult<Self> {
        let tracker = |kind: MetricKind| ExtremeValue::new(kind, thresholds.get(&kind).copied());
        Ok(Self {
            coverage: tracker(MetricKind::Coverage)?,
            crap_index: tracker(MetricKind::CrapIndex)?,
            npath: tracker(MetricKind::NpathComplexity)?,
            ccn: tracker(MetricKind::CyclomaticComplexity)?,
            stats: StreamStats::default(),
        })
    }

    /// Single pass over `violations`, then ready for factor extraction.
    pub fn from_violations<I>(
        thresholds: &BTreeMap<MetricKind, f64>,
        violations: I,
    ) -> CertificationResult<Self>
    where
        I: IntoIterator,
        I::Item: Borrow<ViolationRecord>,
    {
        let mut values = Self::new(thresholds)?;
        values.feed(violations);
        Ok(values)
    }

    /// Route every violation of `violations` in order and log the running totals.
    pub fn feed<I>(&mut self, violations: I)
    where
        I: IntoIterator,
        I::Item: Borrow<ViolationRecord>,
    {
        for violation in violations {
            self.update(violation.borrow());
        }

        let stats = self.stats;
        info!(
            "Processed {} violations ({} certification relevant, {} ignored, {} malformed)",
            stats.total, stats.classified, stats.ignored, stats.malformed
        );
    }

    /// Route one violation to its tracker. Returns the metric it was routed to.
    pub fn update(&mut self, violation: &ViolationRecord) -> Option<MetricKind> {
        self.stats.total += 1;

        let Some(kind) = classify(&violation.rule) else {
            debug!("Ignoring violation of unrelated rule '{}'", violation.rule);
            self.stats.ignored += 1;
            return None;
        };
        self.stats.classified += 1;

        if violation.metric_value().is_none() {
            warn!(
                "Skipping {} violation at {}: missing or non-numeric metric value",
                kind, violation.location
            );
            self.stats.malformed += 1;
            return Some(kind);
        }

        self.get_mut(kind).update(violation);
        Some(kind)
    }

    pub fn get(&self, kind: MetricKind) -> &ExtremeValue {
        match kind {
            MetricKind::Coverage => &self.coverage,
            MetricKind::CrapIndex => &self.crap_index,
            MetricKind::NpathComplexity => &self.npath,
            MetricKind::CyclomaticComplexity => &self.ccn,
        }
    }

    fn get_mut(&mut self, kind: MetricKind) -> &mut ExtremeValue {
        match kind {
            MetricKind::Coverage => &mut self.coverage,
            MetricKind::CrapIndex => &mut self.crap_index,
            MetricKind::NpathComplexity => &mut self.npath,
            MetricKind::CyclomaticComplexity => &mut self.ccn,
        }
    }

    pub fn coverage(&self) -> &ExtremeValue {
        &self.coverage
    }

    pub fn crap_index(&self) -> &ExtremeValue {
        &self.crap_index
    }

    pub fn npath(&self) -> &ExtremeValue {
        &self.npath
    }

    pub fn ccn(&self) -> &ExtremeValue {
        &self.ccn
    }

    /// Trackers in report order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtremeValue> {
        MetricKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Overall factor: product of the four metric factors.
    pub fn calculate_factor(&self) -> f64 {
        combine_factors(self.iter().map(ExtremeValue::factor))
    }
}

/// Product of factors in report order, saturated at `f64::MAX`.
pub(crate) fn combine_factors(factors: impl IntoIterator<Item = f64>) -> f64 {
    factors.into_iter().product::<f64>().min(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceLocation;

    fn violation(rule: &str, metric: f64) -> ViolationRecord {
        ViolationRecord::new(rule, metric, SourceLocation::new("src/Controller.php", 42))
    }

    #[test]
    fn test_classify_rule_names() {
        assert_eq!(
            classify("CyclomaticComplexity"),
            Some(MetricKind::CyclomaticComplexity)
        );
        assert_eq!(
            classify("PHPMD\\OXMD\\Rule\\NpathComplexity"),
            Some(MetricKind::NpathComplexity)
        );
        assert_eq!(classify("NPathComplexity"), Some(MetricKind::NpathComplexity));
        assert_eq!(classify("crap-index"), Some(MetricKind::CrapIndex));
        assert_eq!(classify("CrapIndex"), Some(MetricKind::CrapIndex));
        assert_eq!(classify("code_coverage"), Some(MetricKind::Coverage));
        assert_eq!(classify("rulesets/oxid.xml/Coverage"), Some(MetricKind::Coverage));
        assert_eq!(classify("UnusedLocalVariable"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric("crap-index"), Ok(MetricKind::CrapIndex));
        assert_eq!(parse_metric("npath"), Ok(MetricKind::NpathComplexity));
        assert_eq!(parse_metric("ccn"), Ok(MetricKind::CyclomaticComplexity));
        assert!(matches!(
            parse_metric("loc"),
            Err(CertificationError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_routes_violations_to_matching_tracker() {
        let violations = vec![
            violation("CyclomaticComplexity", 12.0),
            violation("NpathComplexity", 900.0),
            violation("Coverage", 40.0),
            violation("CrapIndex", 50.0),
            violation("ExcessiveMethodLength", 400.0),
        ];
        let values = ExtremeValues::from_violations(&BTreeMap::new(), &violations).unwrap();

        assert_eq!(values.ccn().value(), 12.0);
        assert_eq!(values.npath().value(), 900.0);
        assert_eq!(values.coverage().value(), 40.0);
        assert_eq!(values.crap_index().value(), 50.0);
        assert_eq!(
            values.stats(),
            StreamStats {
                total: 5,
                classified: 4,
                ignored: 1,
                malformed: 0
            }
        );
    }

    #[test]
    fn test_malformed_violation_does_not_corrupt_state() {
        let mut bad = violation("CrapIndex", 0.0);
        bad.metric = None;
        let violations = vec![violation("CrapIndex", 45.0), bad, violation("CrapIndex", 40.0)];
        let values = ExtremeValues::from_violations(&BTreeMap::new(), violations).unwrap();

        assert_eq!(values.crap_index().value(), 45.0);
        assert_eq!(values.crap_index().violations().len(), 1);
        assert_eq!(values.stats().malformed, 1);
    }

    #[test]
    fn test_empty_stream_yields_baseline() {
        let values =
            ExtremeValues::from_violations(&BTreeMap::new(), Vec::<ViolationRecord>::new())
                .unwrap();
        for ev in values.iter() {
            assert_eq!(ev.value(), ev.threshold());
            assert!(ev.violations().is_empty());
        }
        assert_eq!(values.calculate_factor(), 1.0);
    }

    #[test]
    fn test_combined_factor_is_product() {
        let violations = vec![
            violation("CrapIndex", 50.0),            // 3.0
            violation("CyclomaticComplexity", 5.0),  // 2.0
            violation("Coverage", 60.0),             // 2.0
        ];
        let values = ExtremeValues::from_violations(&BTreeMap::new(), violations).unwrap();
        assert!((values.calculate_factor() - 12.0).abs() < 0.00001);
    }

    #[test]
    fn test_threshold_overrides_apply() {
        let thresholds = BTreeMap::from([(MetricKind::CyclomaticComplexity, 10.0)]);
        let values = ExtremeValues::from_violations(
            &thresholds,
            vec![violation("CyclomaticComplexity", 25.0)],
        )
        .unwrap();
        assert_eq!(values.ccn().threshold(), 10.0);
        assert!((values.ccn().factor() - 16.0).abs() < 0.00001);
        assert_eq!(values.crap_index().threshold(), DEFAULT_CRAP_INDEX_THRESHOLD);
    }

    #[test]
    fn test_invalid_override_fails_construction() {
        let thresholds = BTreeMap::from([(MetricKind::Coverage, -5.0)]);
        let err = ExtremeValues::new(&thresholds).unwrap_err();
        assert!(matches!(
            err,
            CertificationError::InvalidThreshold {
                metric: MetricKind::Coverage,
                ..
            }
        ));
    }

    #[test]
    fn test_lazy_stream_is_consumed_once() {
        let mut produced = 0;
        let stream = (0..100).map(|i| {
            produced += 1;
            violation("NpathComplexity", 100.0 + i as f64 * 10.0)
        });
        let values = ExtremeValues::from_violations(&BTreeMap::new(), stream).unwrap();
        assert_eq!(produced, 100);
        assert_eq!(values.npath().value(), 1090.0);
        assert_eq!(values.stats().total, 100);
    }

    #[test]
    fn test_feed_in_batches_matches_single_pass() {
        let batch_one = vec![violation("CrapIndex", 45.0), violation("Coverage", 50.0)];
        let batch_two = vec![violation("CrapIndex", 70.0), violation("Unrelated", 1.0)];

        let mut fed = ExtremeValues::new(&BTreeMap::new()).unwrap();
        fed.feed(&batch_one);
        fed.feed(&batch_two);

        let all: Vec<_> = batch_one.iter().chain(&batch_two).cloned().collect();
        let once = ExtremeValues::from_violations(&BTreeMap::new(), &all).unwrap();

        assert_eq!(fed.stats(), once.stats());
        assert_eq!(fed.crap_index().violations(), once.crap_index().violations());
        assert_eq!(fed.calculate_factor(), once.calculate_factor());
    }
}
