//! Rows of the token usage log.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Column order of the usage CSV.
pub const USAGE_LOG_HEADER: [&str; 7] = [
    "timestamp",
    "month",
    "model",
    "prompt_tokens",
    "completion_tokens",
    "total_tokens",
    "cost_gbp",
];

/// One row of the usage log: token totals for one model in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// RFC 3339 UTC timestamp of the run.
    pub timestamp: String,
    /// `YYYY-MM`, the first seven characters of `timestamp`.
    pub month: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost_gbp: f64,
}

impl UsageRecord {
    pub fn new(
        at: DateTime<Utc>,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
        cost_gbp: f64,
    ) -> Self {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Micros, false);
        Self {
            month: month_of(&timestamp),
            timestamp,
            model: model.to_string(),
            prompt_tokens,
            completion_tokens,
            total_tokens,
            cost_gbp,
        }
    }
}

/// The `YYYY-MM` prefix of a timestamp string.
pub fn month_of(timestamp: &str) -> String {
    timestamp.chars().take(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_derives_month_from_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap();
        let record = UsageRecord::new(at, "gpt-4o-mini", 100, 50, 150, 0.01);
        assert_eq!(record.month, "2026-03");
        assert!(record.timestamp.starts_with("2026-03-09T14:30:00"));
        assert!(record.timestamp.ends_with("+00:00"));
    }

    #[test]
    fn month_of_short_input() {
        assert_eq!(month_of("2026"), "2026");
        assert_eq!(month_of(""), "");
    }
}
