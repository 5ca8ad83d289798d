//! Violation dump ingestion
//!
//! Reads the violation records the host analysis engine wrote out.
//! Accepted shapes:
//! - a JSON array of records
//! - an object with a `violations` array
//! - JSON lines, one record per line
//!
//! Every record is decoded on its own through `ViolationRecord`'s lenient
//! `Deserialize`. A record that fails to decode (no rule, not an object)
//! is logged and skipped; it never aborts the run.

use crate::models::ViolationRecord;
use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::{debug, warn};

/// Read violations from a file, or from stdin when `path` is `-`.
pub fn read_violations(path: &Path) -> Result<Vec<ViolationRecord>> {
    let content = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read violations from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read violations from {}", path.display()))?
    };

    let violations = parse_violations(&content)
        .with_context(|| format!("Unreadable violation dump {}", path.display()))?;
    debug!("Read {} violations from {}", violations.len(), path.display());
    Ok(violations)
}

/// Parse a violation dump in any of the accepted shapes.
pub fn parse_violations(content: &str) -> Result<Vec<ViolationRecord>> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let items = match serde_json::from_str::<JsonValue>(content) {
        Ok(JsonValue::Array(items)) => items,
        Ok(JsonValue::Object(mut obj)) => match obj.remove("violations") {
            Some(JsonValue::Array(items)) => items,
            Some(_) => anyhow::bail!("'violations' must be an array"),
            None => vec![JsonValue::Object(obj)],
        },
        Ok(other) => anyhow::bail!("Expected violation records, found {}", json_kind(&other)),
        Err(_) => json_lines(content)?,
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<ViolationRecord>(item) {
            Ok(violation) => Some(violation),
            Err(e) => {
                warn!("Skipping violation record #{}: {}", index + 1, e);
                None
            }
        })
        .collect())
}

fn json_lines(content: &str) -> Result<Vec<JsonValue>> {
    let mut items = Vec::new();
    let mut broken = 0;

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonValue>(line) {
            Ok(value) => items.push(value),
            Err(e) => {
                warn!("Skipping line {}: {}", number + 1, e);
                broken += 1;
            }
        }
    }

    if items.is_empty() && broken > 0 {
        anyhow::bail!("Input is neither JSON nor JSON lines");
    }
    Ok(items)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
