//! Shared building blocks for the `cleanip` workspace.
//!
//! * [`config`]: the run configuration, loaded once from a JSON file.
//! * [`error`]: the error type every fallible stage reports through.
//! * [`network`]: address and subnet-key models passed between pipeline stages.
//! * [`logging`]: macros that forward to `tracing` with styling targets.

pub mod config;
pub mod error;
pub mod logging;
pub mod network;
