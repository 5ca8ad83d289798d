//! Core data models for oxmd
//!
//! These models describe what the host analysis engine hands over:
//! one record per rule violation, tagged with the rule that produced it
//! and the raw metric value that tripped the rule.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// The four metric kinds that take part in a module certification.
///
/// Variant order is the order of the certification sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Coverage,
    CrapIndex,
    NpathComplexity,
    CyclomaticComplexity,
}

impl MetricKind {
    /// All metric kinds in report order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Coverage,
        MetricKind::CrapIndex,
        MetricKind::NpathComplexity,
        MetricKind::CyclomaticComplexity,
    ];

    /// Kebab-case key used in config files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Coverage => "coverage",
            MetricKind::CrapIndex => "crap-index",
            MetricKind::NpathComplexity => "npath-complexity",
            MetricKind::CyclomaticComplexity => "cyclomatic-complexity",
        }
    }

    /// Human readable label for the certification sheet.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Coverage => "Code Coverage",
            MetricKind::CrapIndex => "C.R.A.P Index",
            MetricKind::NpathComplexity => "NPath Complexity",
            MetricKind::CyclomaticComplexity => "Cyclomatic Complexity",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a violation was reported.
///
/// Decoding never fails on odd field values: a missing or non-string file
/// becomes empty, a missing or unusable line becomes 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SourceLocation {
    #[serde(default, deserialize_with = "deserialize_file")]
    pub file: PathBuf,
    #[serde(default, deserialize_with = "deserialize_line")]
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.file.display(), self.line)
    }
}

/// A single rule violation as emitted by the host analysis engine.
///
/// `metric` is optional because the host does not guarantee a numeric
/// value; records without one are skipped by the trackers. Only a missing
/// `rule` makes a record undecodable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "WireViolation")]
pub struct ViolationRecord {
    /// Identifier of the rule that fired (e.g. `CyclomaticComplexity`)
    pub rule: String,
    /// Raw metric value that violated the rule
    pub metric: Option<f64>,
    pub location: SourceLocation,
    pub description: Option<String>,
}

/// Record as the host writes it: our snake_case fields, the host's
/// camelCase names, and a flat `file`/`line` pair instead of `location`.
#[derive(Deserialize)]
struct WireViolation {
    #[serde(alias = "ruleIdentifier", alias = "ruleName")]
    rule: String,
    #[serde(default, alias = "metricValue", alias = "value")]
    metric: Option<JsonValue>,
    #[serde(default, alias = "sourceLocation")]
    location: Option<JsonValue>,
    #[serde(default, alias = "fileName")]
    file: Option<JsonValue>,
    #[serde(default, alias = "beginLine")]
    line: Option<JsonValue>,
    #[serde(default)]
    description: Option<JsonValue>,
}

impl From<WireViolation> for ViolationRecord {
    fn from(wire: WireViolation) -> Self {
        let location = wire
            .location
            .and_then(|value| serde_json::from_value::<SourceLocation>(value).ok())
            .unwrap_or_else(|| SourceLocation {
                file: wire.file.as_ref().map(file_from_json).unwrap_or_default(),
                line: wire.line.as_ref().map(line_from_json).unwrap_or_default(),
            });
        ViolationRecord {
            rule: wire.rule,
            metric: wire.metric.as_ref().and_then(metric_from_json),
            location,
            description: wire
                .description
                .as_ref()
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        }
    }
}

impl ViolationRecord {
    pub fn new(rule: impl Into<String>, metric: f64, location: SourceLocation) -> Self {
        Self {
            rule: rule.into(),
            metric: Some(metric),
            location,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The metric value if it is usable for extreme value tracking.
    pub fn metric_value(&self) -> Option<f64> {
        self.metric.filter(|v| v.is_finite())
    }
}

fn deserialize_file<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(file_from_json).unwrap_or_default())
}

fn deserialize_line<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(line_from_json).unwrap_or_default())
}

/// Numbers and numeric strings; everything else is `None`.
fn metric_from_json(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn file_from_json(value: &JsonValue) -> PathBuf {
    value.as_str().map(PathBuf::from).unwrap_or_default()
}

/// Truncated non-negative line number; anything unusable is 0.
fn line_from_json(value: &JsonValue) -> u32 {
    metric_from_json(value)
        .filter(|line| *line >= 0.0)
        .map(|line| line.min(u32::MAX as f64) as u32)
        .unwrap_or_default()
}
