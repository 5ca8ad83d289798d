//! CLI command definitions and handlers

mod certify;
mod init;

use crate::certification::parse_metric;
use crate::models::MetricKind;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use certify::CertifyOptions;

/// Parse a `KIND=VALUE` threshold override (e.g. `crap-index=40`)
fn parse_threshold(s: &str) -> Result<(MetricKind, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not of the form METRIC=VALUE", s))?;
    let kind = parse_metric(name).map_err(|e| e.to_string())?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", value))?;
    Ok((kind, value))
}

/// oxmd - Module certification cost from code-quality violations
#[derive(Parser, Debug)]
#[command(name = "oxmd")]
#[command(
    version,
    about = "Compute the certification cost of a module from the rule violations of a code-quality run",
    long_about = "oxmd reads the rule violations produced by a code-quality analysis \
(code coverage, C.R.A.P. index, NPath and cyclomatic complexity), keeps the worst \
value of each metric and turns the four extremes into a certification price:\n\n  \
price = base price + (coverage × crap × npath × ccn factors) × unit cost",
    after_help = "\
Examples:
  oxmd certify violations.json                        Certification sheet for a violation dump
  oxmd certify violations.json --format json          JSON output for scripting
  oxmd certify - < violations.jsonl                   Read JSON lines from stdin
  oxmd certify violations.json --threshold ccn=10     Override a metric threshold
  oxmd init                                           Write an oxmd.toml template"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the certification cost for a violation dump
    #[command(after_help = "\
Examples:
  oxmd certify violations.json                              Text certification sheet
  oxmd certify violations.json -o sheet.txt                 Write the sheet to a file
  oxmd certify violations.json --list-violations            List every violation above the sheet
  oxmd certify violations.json --config ci/oxmd.toml        Use an explicit config file
  oxmd certify violations.json --threshold coverage=80      Stricter coverage baseline
  oxmd certify violations.json --base-price 99 --unit-cost 150")]
    Certify {
        /// Violation dump (JSON array, {\"violations\": [...]} or JSON lines); `-` for stdin
        input: PathBuf,

        /// Config file (default: oxmd.toml or .oxmdrc.json next to the input)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Threshold override as METRIC=VALUE (repeatable)
        #[arg(long = "threshold", short = 't', value_name = "METRIC=VALUE", value_parser = parse_threshold)]
        thresholds: Vec<(MetricKind, f64)>,

        /// Fixed part of the price
        #[arg(long)]
        base_price: Option<f64>,

        /// Price per unit of combined factor
        #[arg(long)]
        unit_cost: Option<f64>,

        /// List every violation above the certification sheet (text format)
        #[arg(long)]
        list_violations: bool,
    },

    /// Write an oxmd.toml config template
    Init {
        /// Directory to write the template to
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show version information
    Version,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Certify {
            input,
            config,
            format,
            output,
            thresholds,
            base_price,
            unit_cost,
            list_violations,
        } => certify::run(CertifyOptions {
            input,
            config,
            format,
            output,
            thresholds,
            base_price,
            unit_cost,
            list_violations,
        }),

        Commands::Init { path } => init::run(&path),

        Commands::Version => {
            println!("oxmd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
