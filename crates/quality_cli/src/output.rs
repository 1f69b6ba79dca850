use anyhow::{Context, Result};
use colored::*;
use quality_core::{RuleDefinition, RuleReport, Violation};
use serde_json::json;
use std::fmt::Write as _;
use std::path::Path;

/// Renders a run report and writes it to `output`, or to stdout.
pub fn write_rule_report(report: &RuleReport, format: &str, output: Option<&Path>) -> Result<()> {
    let content = match format {
        "json" => render_json_report(report)?,
        _ => {
            if output.is_some() {
                colored::control::set_override(false);
            }
            render_text_report(report).context("Failed to render report")?
        }
    };

    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{}", content),
    }

    Ok(())
}

fn render_text_report(report: &RuleReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "\n{}", "═".repeat(60))?;
    writeln!(out, "{}", "  QUALITY REPORT".bold())?;
    writeln!(out, "{}", "═".repeat(60))?;
    writeln!(out, "  Layer: {}    As of: {}", report.layer, report.as_of)?;

    if report.passed() {
        writeln!(out, "\n{} {}", "✓".green().bold(), "All rules PASSED".green().bold())?;
    } else {
        writeln!(out, "\n{} {}", "✗".red().bold(), "Quality checks FAILED".red().bold())?;
    }

    if !report.violations.is_empty() {
        writeln!(out, "\n{}", "Violations:".red().bold())?;
        for (i, violation) in report.violations.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, describe_violation(violation))?;
        }
    }

    if !report.rules.is_empty() {
        writeln!(out, "\n{}", "Rules:".bold())?;
        for summary in &report.rules {
            let status = if summary.failed {
                "ERROR".red().bold()
            } else if summary.violations > 0 {
                format!("{} violations", summary.violations).yellow()
            } else {
                "ok".green()
            };
            writeln!(
                out,
                "  {:<28} {:<20} {:<4} {}",
                summary.rule, summary.table, summary.check, status
            )?;
        }
    }

    writeln!(out, "\n{}", "Summary:".bold())?;
    writeln!(out, "  Rules evaluated: {}", report.stats.rules_evaluated)?;
    writeln!(out, "  Rules failed:    {}", report.stats.rules_failed)?;
    writeln!(out, "  Records scanned: {}", report.stats.records_scanned)?;
    writeln!(out, "  Violations:      {}", report.finding_count())?;
    writeln!(out, "{}", "═".repeat(60))?;

    Ok(out)
}

fn describe_violation(violation: &Violation) -> String {
    let mut location = violation.table.clone();
    if let Some(row) = violation.row {
        location.push_str(&format!(" row {}", row));
    }
    if !violation.keys.is_empty() {
        let keys: Vec<String> = violation
            .keys
            .iter()
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        location.push_str(&format!(" ({})", keys.join(", ")));
    }

    let mut line = format!("[{}] {}: ", violation.rule.bold(), location);
    if violation.is_execution_error() {
        line.push_str(&format!("{}", violation.message.red()));
    } else {
        line.push_str(&format!("{}", violation.message.yellow()));
    }

    if violation.expected.is_some() || violation.actual.is_some() {
        line.push_str(&format!(
            " (expected: {}, actual: {})",
            violation.expected.as_deref().unwrap_or("-"),
            violation.actual.as_deref().unwrap_or("-")
        ));
    }

    if !violation.repairs.is_empty() {
        let repairs: Vec<String> = violation
            .repairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        line.push_str(&format!(" repair: {}", repairs.join(", ")));
    }

    line
}

fn render_json_report(report: &RuleReport) -> Result<String> {
    let output = json!({
        "passed": report.passed(),
        "layer": report.layer,
        "as_of": report.as_of,
        "violations": report.violations,
        "rules": report.rules,
        "summary": {
            "rules_evaluated": report.stats.rules_evaluated,
            "rules_failed": report.stats.rules_failed,
            "records_scanned": report.stats.records_scanned,
            "violation_count": report.finding_count(),
        }
    });

    let mut json = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
    json.push('\n');
    Ok(json)
}

/// Prints rule definitions as an aligned table.
pub fn print_rule_definitions(rules: &[RuleDefinition]) {
    for definition in rules {
        println!(
            "  {:<28} {:<20} {:<20} {}",
            definition.name.bold(),
            definition.table,
            definition.check.type_name(),
            definition.description.as_deref().unwrap_or("")
        );
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
