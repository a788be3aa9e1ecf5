//! CLI command definitions for the `sdr` binary.

pub mod agents;
pub mod keys;
pub mod run;
pub mod usage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use sdr_infra::config::DEFAULT_CONFIG_FILE;

/// Draft cold sales emails with a team of LLM agents and send the best one.
#[derive(Parser, Debug)]
#[command(name = "sdr", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "SDR_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Path to the .env file (values there win over the environment).
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry to stdout.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Write log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the chosen verbosity; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,sdr_core=debug,sdr_infra=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draft with every agent, pick the best email, format and send it.
    Run {
        /// Override the configured brief.
        #[arg(long)]
        brief: Option<String>,

        /// Do everything except send; the email is printed instead.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which API keys are set.
    Keys,

    /// List the sales agents a run would use.
    Agents,

    /// Summarize the usage log per month and model.
    Usage {
        /// Only this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn parse_month(raw: &str) -> Result<String, String> {
    let valid = raw.len() == 7
        && raw.as_bytes()[4] == b'-'
        && raw[..4].chars().all(|c| c.is_ascii_digit())
        && raw[5..]
            .parse::<u8>()
            .is_ok_and(|m| (1..=12).contains(&m));
    if valid {
        Ok(raw.to_string())
    } else {
        Err(format!("expected YYYY-MM, got '{raw}'"))
    }
}
