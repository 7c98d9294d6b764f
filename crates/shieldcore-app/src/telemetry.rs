//! Telemetry event construction and submission through the host's sink.

use crate::error::CoreError;
use crate::ports::{SinkError, TelemetrySink};
use shieldcore_domain::IntegritySignals;
use shieldcore_settings::AppIdentity;
use shieldcore_types::{
    ActionContext, AttestationReport, DeviceInfo, SessionInfo, TelemetryEvent, validate_event,
};
use time::OffsetDateTime;

#[derive(Clone, Debug)]
pub struct EventInput {
    pub action: ActionContext,
    pub signals: IntegritySignals,
    pub attestation: Option<AttestationReport>,
    pub device: Option<DeviceInfo>,
    pub session: Option<SessionInfo>,
    pub signature: Option<String>,
}

/// Build an event stamped with a fresh v4 id. `now` comes from the caller.
///
/// Blank identifying fields are rejected as [`CoreError::MalformedInput`].
pub fn build_event(
    app: &AppIdentity,
    input: EventInput,
    now: OffsetDateTime,
) -> Result<TelemetryEvent, CoreError> {
    let event = TelemetryEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        app_id: app.app_id.clone(),
        app_version: app.app_version.clone(),
        env: app.env.clone(),
        action: input.action,
        signals: input.signals,
        timestamp: now,
        attestation: input.attestation,
        device: input.device,
        session: input.session,
        signature: input.signature,
    };
    validate_event(&event)?;
    Ok(event)
}

/// Hand an event to the sink. Delivery failures are logged and returned, never retried here.
pub fn submit_event(sink: &dyn TelemetrySink, event: &TelemetryEvent) -> Result<(), SinkError> {
    sink.submit(event).inspect_err(|err| {
        tracing::warn!(event_id = %event.event_id, error = %err, "telemetry event dropped");
    })
}
