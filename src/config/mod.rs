//! Configuration module for oxmd
//!
//! This module handles:
//! - Project-level configuration (oxmd.toml)
//! - Per-metric threshold overrides
//! - Certification pricing
//! - CLI defaults

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, normalize_rule_name, CliDefaults,
    MetricConfigOverride, PricingConfig, ProjectConfig, ThresholdValue, CONFIG_FILE_NAMES,
};
