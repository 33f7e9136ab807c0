// Terminal rendering of ingest reports and seed summaries

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use sensorlog_core::ingest::{FailureReason, IngestReport};
use sensorlog_store::{DatasetStatus, SeedSummary};

const RAW_WIDTH: usize = 48;

pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

pub fn failure_table(report: &IngestReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Line", "Kind", "Reason", "Raw"]);

    for failure in &report.failed {
        let kind = match &failure.reason {
            FailureReason::Parse { .. } => "parse".yellow().to_string(),
            FailureReason::Storage { integrity: true, .. } => "integrity".red().to_string(),
            FailureReason::Storage { .. } => "storage".red().to_string(),
        };
        table.add_row(vec![
            failure.line_number.to_string(),
            kind,
            failure.reason.message().to_string(),
            truncate(&failure.line, RAW_WIDTH),
        ]);
    }
    table
}

pub fn print_report(report: &IngestReport) {
    println!("\n{}", "Results:".green().bold());
    println!("  {} {}", "Persisted:".dimmed(), report.persisted.to_string().green());
    println!("  {} {}", "Failed:".dimmed(), report.failed_count().to_string().red());
    if report.cancelled {
        println!("  {}", "Cancelled before the end of the file".yellow());
    }

    if !report.failed.is_empty() {
        println!("{}", failure_table(report));
    }
}

pub fn print_summary(summary: &SeedSummary) {
    println!("\n{}", "Seed summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for outcome in &summary.datasets {
        match &outcome.status {
            DatasetStatus::Seeded { rows } => println!(
                "  {} {} ({} rows)",
                "✓".green(),
                outcome.table,
                rows.to_string().yellow()
            ),
            DatasetStatus::AlreadyPresent => {
                println!("  {} {} (already present)", "-".dimmed(), outcome.table)
            }
        }
        if let Some(report) = &outcome.report {
            if !report.failed.is_empty() {
                print_report(report);
            }
        }
    }
}
