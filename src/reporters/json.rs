//! JSON reporter
//!
//! Outputs the full FinalReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::certification::FinalReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &FinalReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
