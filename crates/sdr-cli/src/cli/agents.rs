//! `sdr agents`: the roster a run would use.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use sdr_core::agent::{SalesAgent, plan_roster};
use sdr_types::config::ManagerConfig;
use sdr_types::llm::ProviderConfig;

use crate::state::AppState;

#[derive(Serialize)]
struct AgentsView<'a> {
    agents: &'a [SalesAgent],
    manager: &'a ManagerConfig,
    skipped_providers: Vec<&'a str>,
}

pub fn list_agents(state: &AppState, json: bool) -> Result<()> {
    let config = &state.config;
    let has_key = |p: &ProviderConfig| state.secrets.get_plain(&p.api_key_env).is_some();
    let roster = plan_roster(&config.providers, &config.personas, has_key);
    let skipped: Vec<&str> = config
        .providers
        .iter()
        .filter(|p| !has_key(p))
        .map(|p| p.name.as_str())
        .collect();

    if json {
        let view = AgentsView {
            agents: &roster,
            manager: &config.manager,
            skipped_providers: skipped,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if roster.is_empty() {
        println!();
        println!(
            "  {} No drafting provider has an API key. Use {} to check.",
            style("i").blue().bold(),
            style("sdr keys").cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Tool").fg(Color::White),
        Cell::new("Persona").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Model").fg(Color::White),
    ]);
    for agent in &roster {
        table.add_row(vec![
            Cell::new(agent.index).fg(Color::Cyan),
            Cell::new(&agent.tool_name).fg(Color::White),
            Cell::new(&agent.persona.name).fg(Color::White),
            Cell::new(&agent.provider).fg(Color::DarkGrey),
            Cell::new(&agent.model).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} agent{}, manager {} ({})",
        style(roster.len()).bold(),
        if roster.len() == 1 { "" } else { "s" },
        style(&config.manager.provider).cyan(),
        config.manager.model
    );
    if !skipped.is_empty() {
        println!(
            "  {}",
            style(format!("Skipped (no API key): {}", skipped.join(", "))).dim()
        );
    }
    println!();
    Ok(())
}
