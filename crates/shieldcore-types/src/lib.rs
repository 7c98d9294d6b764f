//! Stable DTOs and IDs used across the shieldcore workspace.
//!
//! This crate is intentionally boring:
//! - the closed decision/attestation enums and their single wire mapping
//! - the policy document and telemetry event wire shapes
//! - stable reason codes
//! - explain registry for reason codes

#![forbid(unsafe_code)]

pub mod explain;
pub mod fingerprint;
pub mod ids;
pub mod policy;
pub mod signals;
pub mod telemetry;

pub use explain::{Explanation, lookup_explanation};
pub use fingerprint::policy_fingerprint;
pub use policy::{
    ConditionsDocument, PolicyDocument, RuleDocument, WireError, parse_policy_json,
    validate_policy,
};
pub use signals::{AttestationStatus, Decision, IntegritySignals};
pub use telemetry::{
    ActionContext, AttestationProvider, AttestationReport, DeviceInfo, InvalidEvent, Platform,
    SessionInfo, TelemetryEvent, validate_event,
};

/// Stable schema identifiers for shieldcore documents.
pub const SCHEMA_POLICY_V1: &str = "shieldcore.policy.v1";
pub const SCHEMA_TELEMETRY_V1: &str = "shieldcore.telemetry.v1";
pub const SCHEMA_CONFIG_V1: &str = "shieldcore.config.v1";
