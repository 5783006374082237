//! HTTP surface of the server under test: completions, `/metrics` and health.
mod client;
mod executor;
mod request;
mod source;


pub use client::{ClientSettings, Target, build_client, resolve_target};
pub use executor::{HttpExecutor, RequestExecutor};
pub use request::{ChatMessage, Expectation, PlannedRequest, RequestSpec};
pub use source::{HttpMetricsSource, MetricsSource};
