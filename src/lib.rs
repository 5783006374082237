//! Core library for the `streamprobe` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration layering, the streaming decoder, the request
//! executor and load driver, metrics aggregation, reports, and the live
//! dashboard views. The primary user-facing interface is the `streamprobe`
//! command-line application; library APIs may evolve as the CLI grows.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod live;
pub mod load;
pub mod metrics;
pub mod report;
pub mod shutdown;
pub mod stream;
pub mod ui;

#[cfg(test)]
mod test_support;
