//! Top-level configuration types for the SDR pipeline.
//!
//! `SdrConfig` represents `sdr.toml`. Every field has a default, so an
//! empty file (or no file) yields the stock ComplAI campaign with the four
//! OpenAI-compatible providers.

use serde::{Deserialize, Serialize};

use crate::agent::{Persona, default_personas};
use crate::llm::ProviderConfig;

/// Top-level configuration loaded from `sdr.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SdrConfig {
    /// Name of the root tracing span for a run.
    pub workflow_name: String,
    /// Company the sales agents work for.
    pub company: String,
    /// One-sentence description of what the company sells.
    pub company_pitch: String,
    /// Instruction given to every sales agent.
    pub brief: String,
    /// Appended to the brief as "from {sender_name}".
    pub sender_name: Option<String>,
    /// Sender address; required only when actually sending.
    pub from_email: Option<String>,
    /// Recipient address; required only when actually sending.
    pub to_email: Option<String>,
    /// Body format handed to the email provider.
    pub body_format: BodyFormat,
    /// Path of the append-only usage CSV.
    pub usage_log_file: String,
    /// Exchange rate used to express USD pricing as GBP in the usage log.
    pub usd_to_gbp: f64,
    /// Max output tokens per LLM call.
    pub max_tokens: u32,
    /// Sampling temperature for every call; provider default when unset.
    pub temperature: Option<f64>,
    /// Provider + model used for selection and the email formatting stage.
    pub manager: ManagerConfig,
    /// Drafting providers, in roster order.
    pub providers: Vec<ProviderConfig>,
    /// Drafting personas, in roster order within each provider.
    pub personas: Vec<Persona>,
    /// Pricing overrides for cost estimation.
    pub provider_pricing: Vec<ProviderPricing>,
}

/// Default usage log path, also the fallback when `CSV_LOG_FILE` is unset.
pub const DEFAULT_USAGE_LOG_FILE: &str = "usage_log.csv";

impl Default for SdrConfig {
    fn default() -> Self {
        Self {
            workflow_name: "Automated SDR".to_string(),
            company: "ComplAI".to_string(),
            company_pitch: "a company that provides a SaaS tool for ensuring SOC2 compliance \
                and preparing for audits, powered by AI"
                .to_string(),
            brief: "Send a cold sales email addressed to 'Dear CEO'".to_string(),
            sender_name: None,
            from_email: None,
            to_email: None,
            body_format: BodyFormat::Html,
            usage_log_file: DEFAULT_USAGE_LOG_FILE.to_string(),
            usd_to_gbp: 0.79,
            max_tokens: 1024,
            temperature: None,
            manager: ManagerConfig::default(),
            providers: default_providers(),
            personas: default_personas(),
            provider_pricing: Vec::new(),
        }
    }
}

impl SdrConfig {
    /// The brief with the sender's name appended, if one is configured.
    pub fn full_brief(&self, brief: &str) -> String {
        match self.sender_name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("{brief} from {name}"),
            _ => brief.to_string(),
        }
    }
}

/// Which provider and model run the manager and email-formatting calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    pub provider: String,
    pub model: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Content type of the delivered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    /// Subject writer + HTML converter, sent as `text/html`.
    #[default]
    Html,
    /// Subject writer only, chosen body sent as `text/plain`.
    Plain,
}

/// The four OpenAI-compatible endpoints the campaign drafts with.
///
/// OpenAI is required; the others are skipped when their key is absent.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "openai".into(),
            base_url: None,
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            required: true,
            label: Some("OpenAI".into()),
        },
        ProviderConfig {
            name: "deepseek".into(),
            base_url: None,
            model: "deepseek-chat".into(),
            api_key_env: "DEEPSEEK_API_KEY".into(),
            required: false,
            label: Some("DeepSeek".into()),
        },
        ProviderConfig {
            name: "gemini".into(),
            base_url: None,
            model: "gemini-2.0-flash".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
            required: false,
            label: Some("Google".into()),
        },
        ProviderConfig {
            name: "groq".into(),
            base_url: None,
            model: "llama-3.3-70b-versatile".into(),
            api_key_env: "GROQ_API_KEY".into(),
            required: false,
            label: Some("Groq".into()),
        },
    ]
}

/// Cost information for a specific provider/model pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPricing {
    /// Name of the provider (e.g., "openai", "groq").
    pub provider_name: String,
    /// Prefix pattern for matching model names (e.g., "gpt-4o-mini").
    pub model_pattern: String,
    /// Cost per million input tokens in USD.
    pub input_cost_per_million: f64,
    /// Cost per million output tokens in USD.
    pub output_cost_per_million: f64,
}
