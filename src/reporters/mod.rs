//! Output reporters for oxmd certification results
//!
//! Supports multiple output formats:
//! - `text` - Fixed-width certification sheet
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::certification::FinalReport;
use crate::models::ViolationRecord;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a certification report in the specified format
///
/// `violations` is only used by the text sheet, which lists them above
/// the summary when given.
pub fn report(
    report: &FinalReport,
    violations: Option<&[ViolationRecord]>,
    format: &str,
) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, violations, fmt)
}

/// Render a certification report using an OutputFormat enum
pub fn report_with_format(
    report: &FinalReport,
    violations: Option<&[ViolationRecord]>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, violations),
        OutputFormat::Json => json::render(report),
    }
}
