//! Integer codes of ABI version 1. Changing any value requires bumping the ABI version.

use crate::marshal::MarshalError;
use shieldcore_domain::{AttestationStatus, Decision};

pub const ABI_VERSION: u32 = 1;

pub const DECISION_ALLOW: i32 = 0;
pub const DECISION_STEP_UP: i32 = 1;
pub const DECISION_DEGRADE: i32 = 2;
pub const DECISION_DENY: i32 = 3;

pub const ATTESTATION_ABSENT: i32 = -1;
pub const ATTESTATION_UNKNOWN: i32 = 0;
pub const ATTESTATION_PASS: i32 = 1;
pub const ATTESTATION_FAIL: i32 = 2;

pub const PIN_DENIED: i32 = 0;
pub const PIN_ALLOWED: i32 = 1;

pub fn decision_to_code(decision: Decision) -> i32 {
    match decision {
        Decision::Allow => DECISION_ALLOW,
        Decision::StepUp => DECISION_STEP_UP,
        Decision::Degrade => DECISION_DEGRADE,
        Decision::Deny => DECISION_DENY,
    }
}

pub fn decision_from_code(code: i32, field: &'static str) -> Result<Decision, MarshalError> {
    match code {
        DECISION_ALLOW => Ok(Decision::Allow),
        DECISION_STEP_UP => Ok(Decision::StepUp),
        DECISION_DEGRADE => Ok(Decision::Degrade),
        DECISION_DENY => Ok(Decision::Deny),
        other => Err(MarshalError::InvalidCode {
            field,
            value: i64::from(other),
        }),
    }
}

pub fn attestation_from_code(
    code: i32,
    field: &'static str,
) -> Result<Option<AttestationStatus>, MarshalError> {
    match code {
        ATTESTATION_ABSENT => Ok(None),
        ATTESTATION_UNKNOWN => Ok(Some(AttestationStatus::Unknown)),
        ATTESTATION_PASS => Ok(Some(AttestationStatus::Pass)),
        ATTESTATION_FAIL => Ok(Some(AttestationStatus::Fail)),
        other => Err(MarshalError::InvalidCode {
            field,
            value: i64::from(other),
        }),
    }
}

/// `-1` absent, `0` false, `1` true.
pub fn optional_bool_from_code(code: i32, field: &'static str) -> Result<Option<bool>, MarshalError> {
    match code {
        -1 => Ok(None),
        0 => Ok(Some(false)),
        1 => Ok(Some(true)),
        other => Err(MarshalError::InvalidCode {
            field,
            value: i64::from(other),
        }),
    }
}

pub fn flag_from_code(code: i32, field: &'static str) -> Result<bool, MarshalError> {
    match code {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(MarshalError::InvalidCode {
            field,
            value: i64::from(other),
        }),
    }
}

/// Negative means absent; values above `u32::MAX` are rejected.
pub fn optional_u32_from_code(code: i64, field: &'static str) -> Result<Option<u32>, MarshalError> {
    if code < 0 {
        return Ok(None);
    }
    u32::try_from(code)
        .map(Some)
        .map_err(|_| MarshalError::InvalidCode { field, value: code })
}
