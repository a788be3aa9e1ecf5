//! Per-run token accounting.
//!
//! Every LLM call made during a run lands in the `UsageLedger` as one
//! `UsageEntry`. At the end of the run the ledger is summarized into one
//! `UsageRecord` per model for the usage log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sdr_types::llm::Usage;
use sdr_types::usage::UsageRecord;

/// Token usage of a single LLM call.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    /// Who made the call (a sales agent tool name, "manager", "subject_writer", ...).
    pub role: String,
    pub provider: String,
    pub model: String,
    pub usage: Usage,
}

/// Accumulates usage across every call of a run.
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    entries: Vec<UsageEntry>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, role: &str, provider: &str, model: &str, usage: &Usage) {
        tracing::debug!(
            role,
            provider,
            model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Recorded usage"
        );
        self.entries.push(UsageEntry {
            role: role.to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
            usage: usage.clone(),
        });
    }

    pub fn entries(&self) -> &[UsageEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of provider-reported (or computed) totals across all calls.
    pub fn total_tokens(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.usage.total())).sum()
    }

    /// Collapse the ledger into one row per model, in first-use order.
    ///
    /// `cost_gbp` prices a single call from `(provider, model, input, output)`;
    /// each call is priced with its own provider before being summed.
    pub fn summarize<F>(&self, at: DateTime<Utc>, cost_gbp: F) -> Vec<UsageRecord>
    where
        F: Fn(&str, &str, u32, u32) -> f64,
    {
        let mut rows: Vec<UsageRecord> = Vec::new();
        for entry in &self.entries {
            let cost = cost_gbp(
                &entry.provider,
                &entry.model,
                entry.usage.input_tokens,
                entry.usage.output_tokens,
            );
            match rows.iter_mut().find(|r| r.model == entry.model) {
                Some(row) => {
                    row.prompt_tokens += u64::from(entry.usage.input_tokens);
                    row.completion_tokens += u64::from(entry.usage.output_tokens);
                    row.total_tokens += u64::from(entry.usage.total());
                    row.cost_gbp += cost;
                }
                None => rows.push(UsageRecord::new(
                    at,
                    &entry.model,
                    u64::from(entry.usage.input_tokens),
                    u64::from(entry.usage.output_tokens),
                    u64::from(entry.usage.total()),
                    cost,
                )),
            }
        }
        rows
    }
}
