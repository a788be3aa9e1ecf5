//! `sdr keys`: which API keys are available.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use sdr_core::secret::{KeyStatus, key_report};

use crate::state::AppState;

pub fn show_keys(state: &AppState, json: bool) -> Result<()> {
    let report = key_report(&state.config.providers, &state.secrets);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Service").fg(Color::White),
        Cell::new("Variable").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Begins").fg(Color::White),
    ]);

    for status in &report {
        table.add_row(vec![
            Cell::new(&status.label).fg(Color::White),
            Cell::new(&status.env_var).fg(Color::DarkGrey),
            status_cell(status),
            Cell::new(status.prefix.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// One line per key, printed before a run.
pub fn print_key_summary(report: &[KeyStatus]) {
    for status in report {
        let mark = if status.present {
            style("✓").green()
        } else if status.required {
            style("✗").red()
        } else {
            style("-").dim()
        };
        println!("  {mark} {}", status.summary());
    }
}

fn status_cell(status: &KeyStatus) -> Cell {
    match (status.present, status.required) {
        (true, _) => Cell::new("set").fg(Color::Green),
        (false, true) => Cell::new("MISSING").fg(Color::Red),
        (false, false) => Cell::new("not set (optional)").fg(Color::Yellow),
    }
}
