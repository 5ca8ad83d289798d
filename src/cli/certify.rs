//! Certify command - price a module from its violation dump

use crate::certification::ExtremeValues;
use crate::config::{load_config_file, load_project_config, ProjectConfig};
use crate::models::MetricKind;
use crate::{ingest, reporters};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of the certify command after argument parsing
#[derive(Debug, Clone, Default)]
pub struct CertifyOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub thresholds: Vec<(MetricKind, f64)>,
    pub base_price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub list_violations: bool,
}

/// Run the certify command
pub fn run(opts: CertifyOptions) -> Result<()> {
    let config = resolve_config(&opts)?;

    // Fail on bad configuration before touching the input
    let mut values = ExtremeValues::new(&config.thresholds()?)?;
    let cost = config.cost()?;

    let violations = ingest::read_violations(&opts.input)?;
    values.feed(&violations);
    let report = cost.report(&values);
    info!(
        "Combined factor {:.2}, price {:.2}",
        report.combined_factor, report.price
    );

    let format = opts
        .format
        .clone()
        .or_else(|| config.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string());
    let list_violations =
        opts.list_violations || config.defaults.list_violations.unwrap_or(false);
    let rendered = reporters::report(
        &report,
        list_violations.then_some(violations.as_slice()),
        &format,
    )?;

    match &opts.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Config file (explicit or discovered next to the input) with CLI overrides applied.
fn resolve_config(opts: &CertifyOptions) -> Result<ProjectConfig> {
    let mut config = match &opts.config {
        Some(path) => load_config_file(path)?,
        None => load_project_config(input_dir(&opts.input))?,
    };

    for (kind, value) in &opts.thresholds {
        config.set_threshold(*kind, *value);
    }
    if let Some(base_price) = opts.base_price {
        config.pricing.base_price = base_price;
    }
    if let Some(unit_cost) = opts.unit_cost {
        config.pricing.unit_cost = unit_cost;
    }

    Ok(config)
}

fn input_dir(input: &Path) -> &Path {
    if input.as_os_str() == "-" {
        return Path::new(".");
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
