//! Shared domain types for the SDR pipeline.
//!
//! Personas, drafts, outgoing emails, usage rows, configuration and the
//! error enums shared by every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod email;
pub mod error;
pub mod llm;
pub mod usage;
