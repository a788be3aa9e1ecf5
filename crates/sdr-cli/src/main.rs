//! `sdr` entry point.
//!
//! Parses arguments, sets up tracing, loads configuration and dispatches to
//! the command handlers.

use clap::Parser;
use clap_complete::generate;

use sdr_cli::cli::{self, Cli, Commands};
use sdr_cli::state::AppState;
use sdr_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "sdr", &mut std::io::stdout());
        return Ok(());
    }

    let options = TracingOptions {
        enable_otel: cli.otel,
        json: cli.log_json,
        ..TracingOptions::new(cli.log_filter())
    };
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = dispatch(&cli).await;
    shutdown_tracing();
    result
}

async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli).await?;

    match &cli.command {
        Commands::Run { brief, dry_run } => {
            cli::run::run_campaign(&state, brief.clone(), *dry_run, cli.json, cli.quiet).await
        }
        Commands::Keys => cli::keys::show_keys(&state, cli.json),
        Commands::Agents => cli::agents::list_agents(&state, cli.json),
        Commands::Usage { month } => cli::usage::show_usage(&state, month.as_deref(), cli.json),
        Commands::Completions { .. } => Ok(()),
    }
}
