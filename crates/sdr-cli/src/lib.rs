//! `sdr` command-line application.
//!
//! The binary in `main.rs` is a thin dispatcher; argument definitions and
//! command handlers live here so they can be exercised from tests.

pub mod cli;
pub mod state;
