//! End-to-end tests for the selection pipeline. Nothing in here ships.

#[cfg(test)]
mod support;

#[cfg(test)]
mod pipeline;

#[cfg(test)]
mod probe;
