//! Telemetry event wire shape.
//!
//! The host builds and submits these after a decision. The core only defines the shape so that
//! every platform emits the same JSON.

use crate::{AttestationStatus, IntegritySignals};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// A required telemetry field was empty or whitespace.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("telemetry event failed validation: {0} must not be empty")]
pub struct InvalidEvent(pub &'static str);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ActionContext {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttestationProvider {
    AppAttest,
    PlayIntegrity,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AttestationReport {
    pub provider: AttestationProvider,
    pub result: AttestationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceInfo {
    pub platform: Platform,
    pub os_version: String,
    pub model: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id_hash: Option<String>,
}

/// `shieldcore.telemetry.v1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TelemetryEvent {
    /// Unique per event.
    pub event_id: String,
    pub app_id: String,
    pub app_version: String,
    pub env: String,
    pub action: ActionContext,
    pub signals: IntegritySignals,

    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionInfo>,

    /// Host-computed signature over the event. Carried verbatim; shieldcore never signs or verifies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Reject events the ingestion side would refuse: every identifying string must be non-blank.
///
/// `device` and `signature` are optional here, but when present their strings are held to the
/// same rule.
pub fn validate_event(event: &TelemetryEvent) -> Result<(), InvalidEvent> {
    non_empty("event_id", &event.event_id)?;
    non_empty("app_id", &event.app_id)?;
    non_empty("app_version", &event.app_version)?;
    non_empty("env", &event.env)?;
    if let Some(device) = &event.device {
        non_empty("device.os_version", &device.os_version)?;
        non_empty("device.model", &device.model)?;
    }
    non_empty("action.name", &event.action.name)?;
    if let Some(session) = &event.session {
        non_empty("session.session_id", &session.session_id)?;
    }
    if let Some(signature) = &event.signature {
        non_empty("signature", signature)?;
    }
    Ok(())
}

fn non_empty(field: &'static str, value: &str) -> Result<(), InvalidEvent> {
    if value.trim().is_empty() {
        return Err(InvalidEvent(field));
    }
    Ok(())
}
