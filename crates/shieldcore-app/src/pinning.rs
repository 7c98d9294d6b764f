use crate::error::CoreError;
use shieldcore_domain::{PinSet, PinVerdict};
use time::OffsetDateTime;

/// Check a presented SPKI hash against the configured pin set.
///
/// A missing pin configuration is an error; an empty one means pinning is off.
pub fn check_pin(
    pins: Option<&PinSet>,
    presented_hash: &str,
    now: OffsetDateTime,
) -> Result<PinVerdict, CoreError> {
    let pins = pins.ok_or_else(|| {
        tracing::warn!("pin check requested without a pin configuration");
        CoreError::ConfigurationMissing("pin set".to_string())
    })?;

    let verdict = pins.check(presented_hash, now);
    if verdict.is_allowed() {
        tracing::debug!(verdict = verdict.code(), "pin accepted");
    } else {
        tracing::warn!(verdict = verdict.code(), hash = presented_hash, "pin rejected");
    }
    Ok(verdict)
}

pub fn pin_exit_code(verdict: PinVerdict) -> i32 {
    if verdict.is_allowed() { 0 } else { 2 }
}
