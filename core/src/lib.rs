//! # cleanip core
//!
//! Turns a scan-result file into a handful of low-latency representative
//! addresses:
//!
//! * [`discovery`]: finds the newest scan-result file.
//! * [`extract`]: pulls every IP literal out of the JSON document.
//! * [`selection`]: grouping, sampling, threshold filtering and picking.
//! * [`prober`]: measures round-trip times with ICMP echo.
//! * [`service`]: runs the stages in order for one configuration.
//! * [`output`]: writes the final comma-separated line.

pub mod discovery;
pub mod extract;
mod network;
pub mod output;
pub mod prober;
pub mod selection;
pub mod service;
pub mod signal;
