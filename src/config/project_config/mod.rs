//! Project-level configuration support
//!
//! Loads per-project configuration from `oxmd.toml` or `.oxmdrc.json`.
//!
//! # Configuration Format
//!
//! ```toml
//! # oxmd.toml
//!
//! [metrics.cyclomatic-complexity]
//! threshold = 10
//!
//! [metrics.crap-index]
//! threshold = 30
//!
//! [pricing]
//! base_price = 119.0
//! unit_cost = 200.0
//!
//! [defaults]
//! format = "text"
//! list_violations = false
//! ```

use crate::certification::{parse_metric, CertificationCost, CertificationError, CertificationResult};
use crate::models::MetricKind;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &["oxmd.toml", ".oxmdrc.json"];

/// Project-level configuration loaded from oxmd.toml or .oxmdrc.json
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Per-metric overrides, keyed by metric name (e.g. `crap-index`)
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricConfigOverride>,

    /// Certification pricing
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Configuration override for a single metric
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MetricConfigOverride {
    /// Threshold seeding the extreme value tracker (default depends on the metric)
    #[serde(default)]
    pub threshold: Option<ThresholdValue>,
}

/// A threshold as written in the config file. Only numbers are valid;
/// other scalars are kept so the error can name what was written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v as f64),
            ThresholdValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdValue::Integer(v) => write!(f, "{}", v),
            ThresholdValue::Float(v) => write!(f, "{}", v),
            ThresholdValue::Boolean(v) => write!(f, "{}", v),
            ThresholdValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Pricing parameters for the certification cost
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Fixed part of the price (default: 119)
    #[serde(default = "default_base_price")]
    pub base_price: f64,

    /// Price per unit of combined factor (default: 200)
    #[serde(default = "default_unit_cost")]
    pub unit_cost: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price: default_base_price(),
            unit_cost: default_unit_cost(),
        }
    }
}

fn default_base_price() -> f64 {
    crate::certification::DEFAULT_BASE_PRICE
}

fn default_unit_cost() -> f64 {
    crate::certification::DEFAULT_UNIT_COST
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,

    /// List every violation above the certification sheet
    #[serde(default)]
    pub list_violations: Option<bool>,
}

/// Load project configuration from the directory holding the analysis input.
///
/// Searches for `oxmd.toml`, then `.oxmdrc.json`. Returns the default
/// configuration if neither exists. A config file that exists but cannot
/// be parsed is an error.
pub fn load_project_config(dir: &Path) -> anyhow::Result<ProjectConfig> {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            debug!("Loaded project config from {}", path.display());
            return Ok(config);
        }
    }

    debug!("No project config found in {}, using defaults", dir.display());
    Ok(ProjectConfig::default())
}

/// Load a config file, choosing the format by extension (`.json` or TOML).
pub fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?
    };
    Ok(config)
}

impl ProjectConfig {
    /// Resolve configured thresholds to numbers, failing on anything unusable.
    pub fn thresholds(&self) -> CertificationResult<BTreeMap<MetricKind, f64>> {
        let mut thresholds = BTreeMap::new();

        for (name, config) in &self.metrics {
            let kind = parse_metric(name)?;
            let Some(raw) = &config.threshold else {
                continue;
            };
            let value = raw
                .as_f64()
                .ok_or_else(|| CertificationError::InvalidThreshold {
                    metric: kind,
                    reason: format!("expected a number, got {}", raw),
                })?;
            if thresholds.insert(kind, value).is_some() {
                return Err(CertificationError::InvalidThreshold {
                    metric: kind,
                    reason: "threshold configured more than once".to_string(),
                });
            }
        }

        Ok(thresholds)
    }

    /// Set a threshold, replacing any configured one for the same metric.
    pub fn set_threshold(&mut self, kind: MetricKind, value: f64) {
        self.metrics.retain(|name, _| parse_metric(name).ok() != Some(kind));
        self.metrics.insert(
            kind.key().to_string(),
            MetricConfigOverride {
                threshold: Some(ThresholdValue::Float(value)),
            },
        );
    }

    /// Validated pricing
    pub fn cost(&self) -> CertificationResult<CertificationCost> {
        CertificationCost::new(self.pricing.base_price, self.pricing.unit_cost)
    }
}

/// Normalize a rule or metric name for lookup
/// Converts various formats to kebab-case for matching
pub fn normalize_rule_name(name: &str) -> String {
    // CyclomaticComplexity -> cyclomatic-complexity
    // CRAPIndex -> crap-index
    // npath_complexity -> npath-complexity
    // crap-index -> crap-index

    let mut result = String::new();
    let chars: Vec<char> = name.trim().chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // Hyphen before an uppercase letter that starts a new word:
            // after a lowercase letter/digit, or at the end of an acronym
            let prev_is_lower =
                i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' || *c == ' ' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    // Remove common suffixes
    result.trim_end_matches("-rule").to_string()
}
