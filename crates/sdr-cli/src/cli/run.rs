//! `sdr run`: one full campaign run.
//!
//! Usage is appended to the CSV log whether or not the run succeeds, so
//! tokens spent before a failure are still accounted for.

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use secrecy::ExposeSecret;
use serde::Serialize;

use sdr_core::delivery::{BoxEmailSender, DryRunSender};
use sdr_core::pipeline::{RunOutcome, SdrPipeline};
use sdr_core::secret::{SENDGRID_API_KEY, SecretProvider, key_report};
use sdr_core::usage::UsageLedger;
use sdr_infra::llm::build_registry;
use sdr_infra::llm::pricing::{estimate_cost_gbp, format_cost_gbp};
use sdr_infra::sendgrid::SendGridSender;
use sdr_infra::usage_log::CsvUsageLog;
use sdr_types::config::SdrConfig;
use sdr_types::error::EmailError;
use sdr_types::usage::UsageRecord;

use crate::cli::keys::print_key_summary;
use crate::state::AppState;

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a RunOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    usage: &'a [UsageRecord],
    total_cost_gbp: f64,
}

pub async fn run_campaign(
    state: &AppState,
    brief: Option<String>,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let config = &state.config;
    let chatty = !json && !quiet;

    if chatty {
        println!();
        println!("  {}", style("API keys").bold());
        print_key_summary(&key_report(&config.providers, &state.secrets));
        println!();
    }

    let registry =
        build_registry(&config.providers, &state.secrets).context("setting up LLM providers")?;
    let sender = if dry_run {
        BoxEmailSender::new(DryRunSender)
    } else {
        let api_key = state
            .secrets
            .get(SENDGRID_API_KEY)
            .filter(|k| !k.expose_secret().trim().is_empty())
            .ok_or_else(|| EmailError::MissingApiKey(SENDGRID_API_KEY.to_string()))?;
        BoxEmailSender::new(SendGridSender::new(api_key)?)
    };
    let pipeline = SdrPipeline::new(config, registry, sender)?;

    let brief = brief.unwrap_or_else(|| config.brief.clone());
    if chatty {
        println!(
            "  {} Drafting with {} agent{}...",
            style("*").cyan().bold(),
            pipeline.roster().len(),
            if pipeline.roster().len() == 1 { "" } else { "s" }
        );
    }

    let mut ledger = UsageLedger::new();
    let result = pipeline.run(&brief, &mut ledger).await;

    let usage = record_usage(config, &ledger);
    let total_cost_gbp: f64 = usage.iter().map(|r| r.cost_gbp).sum();

    if json {
        let report = RunReport {
            outcome: result.as_ref().ok(),
            error: result.as_ref().err().map(ToString::to_string),
            usage: &usage,
            total_cost_gbp,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        if let Ok(outcome) = &result {
            print_outcome(outcome);
        }
        print_usage(&usage, total_cost_gbp);
    }

    result.map(|_| ()).map_err(Into::into)
}

/// Price the ledger per model and append it to the usage log.
///
/// Called whether or not the run succeeded. A failed append is only a
/// warning; the rows are returned either way for display.
pub fn record_usage(config: &SdrConfig, ledger: &UsageLedger) -> Vec<UsageRecord> {
    let usage = ledger.summarize(Utc::now(), |provider, model, input, output| {
        estimate_cost_gbp(
            input,
            output,
            model,
            provider,
            &config.provider_pricing,
            config.usd_to_gbp,
        )
    });
    if usage.is_empty() {
        return usage;
    }
    let log = CsvUsageLog::new(&config.usage_log_file);
    if let Err(e) = log.append(&usage) {
        tracing::warn!(path = %log.path().display(), error = %e, "Could not write usage log");
    }
    usage
}

fn print_outcome(outcome: &RunOutcome) {
    let chosen = outcome.chosen();
    println!();
    println!("  {}", style("FINAL OUTPUT").green().bold());
    println!(
        "  {} {} of {} drafts",
        style("Chosen:").dim(),
        style(&chosen.tool_name).cyan(),
        outcome.drafts.len()
    );
    if outcome.selection.fallback {
        println!(
            "  {}",
            style("Manager reply was unreadable, first draft used").yellow()
        );
    } else if let Some(reason) = &outcome.selection.reason {
        println!("  {} {}", style("Why:").dim(), reason);
    }
    println!("  {} {}", style("Subject:").dim(), style(&outcome.email.subject).bold());
    println!();
    for line in outcome.email.body.lines() {
        println!("    {line}");
    }
    println!();

    let receipt = &outcome.receipt;
    if receipt.dry_run {
        println!("  {} Dry run, email not sent", style("i").blue().bold());
    } else {
        println!(
            "  {} Sent via {}{}{}",
            style("✓").green().bold(),
            receipt.provider,
            receipt
                .status_code
                .map(|s| format!(" (HTTP {s})"))
                .unwrap_or_default(),
            receipt
                .message_id
                .as_deref()
                .map(|id| format!(", id {id}"))
                .unwrap_or_default()
        );
    }
    println!(
        "  {}",
        style(format!("Run {}", outcome.run_id)).dim()
    );
}

fn print_usage(usage: &[UsageRecord], total_cost_gbp: f64) {
    if usage.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::White),
        Cell::new("Prompt").fg(Color::White),
        Cell::new("Completion").fg(Color::White),
        Cell::new("Total").fg(Color::White),
        Cell::new("Cost").fg(Color::White),
    ]);
    for row in usage {
        table.add_row(vec![
            Cell::new(&row.model).fg(Color::Cyan),
            Cell::new(row.prompt_tokens),
            Cell::new(row.completion_tokens),
            Cell::new(row.total_tokens),
            Cell::new(format_cost_gbp(row.cost_gbp)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} {}",
        style("Estimated cost:").dim(),
        format_cost_gbp(total_cost_gbp)
    );
    println!();
}
