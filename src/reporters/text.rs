//! Text (terminal) reporter: the fixed-width certification sheet

use crate::certification::{FinalReport, MetricReport};
use crate::models::{SourceLocation, ViolationRecord};
use anyhow::Result;

/// Width of the separator rules
const LINE_WIDTH: usize = 80;
/// Column widths of a metric row
const LABEL_WIDTH: usize = 45;
const VALUE_WIDTH: usize = 10;
const FACTOR_GAP: usize = 17;
const FACTOR_WIDTH: usize = 7;
/// Indent of the Factor/Price summary rows
const TOTALS_INDENT: usize = 55;
const TOTALS_WIDTH: usize = 15;
/// Longest path shown before it is cut from the left
const MAX_PATH_WIDTH: usize = 64;
/// Wrap width for violation descriptions
const WRAP_WIDTH: usize = 80;

/// Render the certification sheet, optionally preceded by every violation.
pub fn render(report: &FinalReport, violations: Option<&[ViolationRecord]>) -> Result<String> {
    let mut out = String::new();

    if let Some(violations) = violations {
        out.push('\n');
        for violation in violations {
            push_rule(&mut out, '=');
            push_location(&mut out, &violation.location);
            push_rule(&mut out, '=');
            out.push_str(&wrap(&describe(violation), WRAP_WIDTH));
            out.push_str("\n\n");
        }
    }

    push_rule(&mut out, '=');
    out.push_str(&format!(
        "{:<LABEL_WIDTH$}{:>VALUE_WIDTH$}{:>width$}\n",
        " Oxid Module Certification",
        "Value",
        "Factor",
        width = FACTOR_GAP + FACTOR_WIDTH
    ));
    push_rule(&mut out, '=');

    for (i, metric) in report.metrics.iter().enumerate() {
        if i > 0 {
            push_rule(&mut out, '-');
        }
        push_metric(&mut out, metric);
    }

    push_rule(&mut out, '=');
    push_total(&mut out, "Factor:", report.combined_factor);
    push_rule(&mut out, '=');
    push_total(&mut out, "Price:", report.price);
    push_rule(&mut out, '=');

    Ok(out)
}

fn push_rule(out: &mut String, c: char) {
    out.extend(std::iter::repeat(c).take(LINE_WIDTH));
    out.push('\n');
}

fn push_metric(out: &mut String, metric: &MetricReport) {
    out.push_str(&format!(
        "{:<LABEL_WIDTH$}{:>VALUE_WIDTH$.2}{}{:>FACTOR_WIDTH$.2}\n",
        format!(" {}", metric.label),
        metric.value,
        " ".repeat(FACTOR_GAP),
        metric.factor
    ));
    for location in &metric.locations {
        push_location(out, location);
    }
}

fn push_total(out: &mut String, label: &str, amount: f64) {
    out.push_str(&format!(
        "{}{:<9}{:>TOTALS_WIDTH$}\n",
        " ".repeat(TOTALS_INDENT),
        label,
        format_amount(amount)
    ));
}

fn push_location(out: &mut String, location: &SourceLocation) {
    let path = location.file.display().to_string();
    out.push_str(&format!("  {} ({})\n", shorten_path(&path), location.line));
}

fn describe(violation: &ViolationRecord) -> String {
    match &violation.description {
        Some(description) => description.clone(),
        None => match violation.metric {
            Some(metric) => format!("{} violation with a metric value of {}", violation.rule, metric),
            None => format!("{} violation", violation.rule),
        },
    }
}

/// Cut long paths from the left so the file name stays visible.
/// Uses chars() to stay on UTF-8 boundaries.
fn shorten_path(path: &str) -> String {
    let count = path.chars().count();
    if count <= MAX_PATH_WIDTH {
        return path.to_string();
    }
    let skip = count - (MAX_PATH_WIDTH - 1);
    format!("…{}", path.chars().skip(skip).collect::<String>())
}

/// Two decimals, `.` as thousands separator and `,` as decimal separator.
fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let negative = amount < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    format!("{}{},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Greedy word wrap; words longer than `width` stay on their own line.
fn wrap(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines.join("\n")
}
