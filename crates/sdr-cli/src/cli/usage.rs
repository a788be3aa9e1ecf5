//! `sdr usage`: monthly totals from the usage log.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use sdr_infra::llm::pricing::format_cost_gbp;
use sdr_infra::usage_log::{CsvUsageLog, monthly_summary};

use crate::state::AppState;

pub fn show_usage(state: &AppState, month: Option<&str>, json: bool) -> Result<()> {
    let log = CsvUsageLog::new(&state.config.usage_log_file);
    let records = log
        .read_all()
        .with_context(|| format!("reading {}", log.path().display()))?;
    let summary = monthly_summary(&records, month);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.is_empty() {
        println!();
        println!(
            "  {} No usage recorded in {}{}",
            style("i").blue().bold(),
            log.path().display(),
            month.map(|m| format!(" for {m}")).unwrap_or_default()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Month").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Rows").fg(Color::White),
        Cell::new("Prompt").fg(Color::White),
        Cell::new("Completion").fg(Color::White),
        Cell::new("Total").fg(Color::White),
        Cell::new("Cost").fg(Color::White),
    ]);
    for row in &summary {
        table.add_row(vec![
            Cell::new(&row.month).fg(Color::DarkGrey),
            Cell::new(&row.model).fg(Color::Cyan),
            Cell::new(row.runs),
            Cell::new(row.prompt_tokens),
            Cell::new(row.completion_tokens),
            Cell::new(row.total_tokens),
            Cell::new(format_cost_gbp(row.cost_gbp)),
        ]);
    }

    let total: f64 = summary.iter().map(|r| r.cost_gbp).sum();
    println!();
    println!("{table}");
    println!("  {} {}", style("Total:").dim(), format_cost_gbp(total));
    println!();
    Ok(())
}
