//! Concrete implementations of the `sdr-core` seams: OpenAI-compatible LLM
//! clients, SendGrid delivery, the CSV usage log, `.env`/environment
//! secrets and the `sdr.toml` loader.

pub mod config;
pub mod llm;
pub mod secret;
pub mod sendgrid;
pub mod usage_log;
