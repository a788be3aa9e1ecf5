//! Append-only CSV usage log.
//!
//! Columns: `timestamp,month,model,prompt_tokens,completion_tokens,total_tokens,cost_gbp`.
//! The header is written only when the file is new or empty. Reading is
//! lenient so logs written by older tools still load: alternate column
//! names are accepted and missing totals or costs are filled in.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sdr_types::error::UsageLogError;
use sdr_types::usage::{USAGE_LOG_HEADER, UsageRecord, month_of};

/// Handle on the usage CSV at a fixed path.
#[derive(Debug, Clone)]
pub struct CsvUsageLog {
    path: PathBuf,
}

impl CsvUsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records`, creating the file (and its parent directories) if needed.
    pub fn append(&self, records: &[UsageRecord]) -> Result<(), UsageLogError> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(USAGE_LOG_HEADER).map_err(csv_error)?;
        }
        for record in records {
            writer.serialize(record).map_err(csv_error)?;
        }
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), rows = records.len(), "Appended usage rows");
        Ok(())
    }

    /// Every row in the log, oldest first. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<UsageRecord>, UsageLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(csv_error)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<RawUsageRow>() {
            records.push(row.map_err(csv_error)?.into_record());
        }
        Ok(records)
    }
}

/// A usage row as found on disk, before defaults are applied.
#[derive(Debug, Deserialize)]
struct RawUsageRow {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    month: Option<String>,
    #[serde(default)]
    model: String,
    #[serde(default, alias = "prompt_token_count", alias = "input_tokens")]
    prompt_tokens: Option<u64>,
    #[serde(default, alias = "completion_token_count", alias = "output_tokens")]
    completion_tokens: Option<u64>,
    #[serde(default, alias = "total_token_count")]
    total_tokens: Option<u64>,
    #[serde(default, alias = "total_cost", alias = "cost")]
    cost_gbp: Option<f64>,
}

impl RawUsageRow {
    fn into_record(self) -> UsageRecord {
        let prompt_tokens = self.prompt_tokens.unwrap_or(0);
        let completion_tokens = self.completion_tokens.unwrap_or(0);
        let month = self
            .month
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| month_of(&self.timestamp));
        UsageRecord {
            month,
            total_tokens: self
                .total_tokens
                .unwrap_or(prompt_tokens + completion_tokens),
            timestamp: self.timestamp,
            model: self.model,
            prompt_tokens,
            completion_tokens,
            cost_gbp: self.cost_gbp.unwrap_or(0.0),
        }
    }
}

/// Per-month, per-model totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyUsage {
    pub month: String,
    pub model: String,
    /// Number of log rows (one per model per run).
    pub runs: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost_gbp: f64,
}

/// Aggregate rows by month and model, sorted by month then model.
///
/// With `month` set, only that `YYYY-MM` is included.
pub fn monthly_summary(records: &[UsageRecord], month: Option<&str>) -> Vec<MonthlyUsage> {
    let mut groups: BTreeMap<(String, String), MonthlyUsage> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| month.is_none_or(|m| r.month == m))
    {
        let entry = groups
            .entry((record.month.clone(), record.model.clone()))
            .or_insert_with(|| MonthlyUsage {
                month: record.month.clone(),
                model: record.model.clone(),
                runs: 0,
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
                cost_gbp: 0.0,
            });
        entry.runs += 1;
        entry.prompt_tokens += record.prompt_tokens;
        entry.completion_tokens += record.completion_tokens;
        entry.total_tokens += record.total_tokens;
        entry.cost_gbp += record.cost_gbp;
    }
    groups.into_values().collect()
}

fn csv_error(err: csv::Error) -> UsageLogError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => UsageLogError::Io(io),
        _ => UsageLogError::Format(message),
    }
}
