//! Shared test utilities for the shieldcore workspace.
//!
//! Lives in its own crate so CLI integration tests, the BDD harness, and `xtask` share one copy.

use serde_json::Value;
use std::path::PathBuf;

pub const EVENT_ID_PLACEHOLDER: &str = "__EVENT_ID__";
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";

/// Workspace-level `tests/fixtures` directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

/// Path of a fixture relative to `tests/fixtures`, e.g. `policies/transfer.json`.
pub fn fixture_path(relative: &str) -> PathBuf {
    fixtures_dir().join(relative)
}

/// Replace per-run fields of a telemetry event with fixed placeholders for golden comparison.
///
/// Only the root object is touched: `event_id` and `timestamp` are per-run there, while a nested
/// `attestation.timestamp` is host data and stays as is.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut()
        && obj.contains_key("event_id")
        && obj.contains_key("action")
    {
        obj.insert(
            "event_id".to_string(),
            Value::String(EVENT_ID_PLACEHOLDER.to_string()),
        );
        if obj.contains_key("timestamp") {
            obj.insert(
                "timestamp".to_string(),
                Value::String(TIMESTAMP_PLACEHOLDER.to_string()),
            );
        }
    }
    value
}
