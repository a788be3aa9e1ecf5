//! Business logic for the SDR pipeline.
//!
//! Defines the provider, secret and delivery seams that `sdr-infra`
//! implements, and the run itself: draft with every sales agent, let the
//! manager pick one, format it, send it, and account for every token.

pub mod agent;
pub mod delivery;
pub mod llm;
pub mod pipeline;
pub mod secret;
pub mod usage;

#[cfg(test)]
pub(crate) mod test_support;
