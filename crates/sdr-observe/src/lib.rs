//! Observability for the SDR pipeline: subscriber setup and OpenTelemetry
//! export of the run and `gen_ai.complete` spans.

pub mod tracing_setup;
