//! Report rendering
//!
//! Two surfaces: a console listing printed after a run, and a markdown
//! summary written next to the working directory for sharing.

use crate::report::groups::{DiscountGroup, PromoReport};
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn group_heading(group: &DiscountGroup) -> String {
    match group.discount_percent {
        Some(percent) => format!("Discount {}%", percent),
        None => "Unknown discount".to_string(),
    }
}

/// Formats the report for console output
pub fn format_report(report: &PromoReport, race_id: &str, race_title: Option<&str>) -> String {
    let mut out = String::new();
    match race_title {
        Some(title) => out.push_str(&format!("=== Promo codes: {} ({}) ===\n", title, race_id)),
        None => out.push_str(&format!("=== Promo codes: race {} ===\n", race_id)),
    }

    if report.is_empty() {
        out.push_str("\nEvery discovered code is exhausted.\n");
        return out;
    }

    for group in &report.groups {
        out.push_str(&format!("\n{}:\n", group_heading(group)));
        for entry in &group.entries {
            match entry.usage_left {
                Some(usage) => out.push_str(&format!(
                    "  {}: {} left ({})\n",
                    entry.code, usage, entry.url
                )),
                None => out.push_str(&format!(
                    "  {}: usage unknown ({})\n",
                    entry.code, entry.url
                )),
            }
        }
    }

    out.push_str(&format!(
        "\nTotals: {} codes, {} known uses, {} without data\n",
        report.total_codes, report.total_known_usage, report.total_unknown
    ));
    for group in &report.groups {
        let mut line = format!(
            "  {}: {} codes, {} uses",
            group_heading(group),
            group.code_count(),
            group.known_usage
        );
        if group.unknown_count > 0 {
            line.push_str(&format!(", {} without data", group.unknown_count));
        }
        line.push('\n');
        out.push_str(&line);
    }
    out
}

/// Formats the report as a markdown summary
pub fn format_markdown_summary(
    report: &PromoReport,
    race_id: &str,
    race_title: Option<&str>,
) -> String {
    let mut md = String::new();

    md.push_str("# Promo Code Summary\n\n");
    match race_title {
        Some(title) => md.push_str(&format!("- **Race**: {} ({})\n", title, race_id)),
        None => md.push_str(&format!("- **Race**: {}\n", race_id)),
    }
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.is_empty() {
        md.push_str("Every discovered code is exhausted.\n");
        return md;
    }

    for group in &report.groups {
        md.push_str(&format!("## {}\n\n", group_heading(group)));
        for entry in &group.entries {
            match entry.usage_left {
                Some(usage) => md.push_str(&format!(
                    "- [{}]({}) — {} left\n",
                    entry.code, entry.url, usage
                )),
                None => md.push_str(&format!(
                    "- [{}]({}) — usage unknown\n",
                    entry.code, entry.url
                )),
            }
        }
        md.push('\n');
    }

    md.push_str("## Totals\n\n");
    md.push_str("| Discount | Codes | Known uses | Unknown |\n");
    md.push_str("|----------|-------|------------|--------|\n");
    for group in &report.groups {
        let label = match group.discount_percent {
            Some(percent) => format!("{}%", percent),
            None => "unknown".to_string(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            label,
            group.code_count(),
            group.known_usage,
            group.unknown_count
        ));
    }
    md.push_str(&format!(
        "| **All** | {} | {} | {} |\n",
        report.total_codes, report.total_known_usage, report.total_unknown
    ));

    md
}

/// Writes the markdown summary to disk
pub fn write_markdown_summary(
    report: &PromoReport,
    race_id: &str,
    race_title: Option<&str>,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report, race_id, race_title);
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;
    Ok(())
}
