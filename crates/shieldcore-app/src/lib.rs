//! Use case orchestration for shieldcore.
//!
//! This crate coordinates the domain and settings layers with host-provided ports. It stays thin:
//! decisions live in `shieldcore-domain`, I/O lives in the host.
//!
//! The CLI and FFI crates depend on this; they only handle marshalling and process concerns.

#![forbid(unsafe_code)]

mod config;
mod decide;
mod error;
mod explain;
mod pinning;
mod policy;
mod ports;
mod telemetry;

pub use config::load_config;
pub use decide::{DecideInput, DecideOutput, decide, decision_exit_code};
pub use error::CoreError;
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use pinning::{check_pin, pin_exit_code};
pub use policy::{
    LoadedPolicy, PolicyOrigin, PolicySummary, load_policy, load_policy_text, parse_policy,
    summarize_policy,
};
pub use ports::{FetchError, PolicyFetcher, PolicyQuery, SinkError, TelemetrySink};
pub use telemetry::{EventInput, build_event, submit_event};
