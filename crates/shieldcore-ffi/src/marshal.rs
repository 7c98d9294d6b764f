//! Validation and copying of caller-owned ABI data.
//!
//! Every reader here validates before it dereferences and copies what it reads into owned Rust
//! values. The resulting call snapshot owns all its data, so no caller pointer outlives the call.

use crate::abi::{
    ShieldConditions, ShieldPinSet, ShieldPolicy, ShieldRule, ShieldSignals, ShieldStr,
    ShieldStrArray,
};
use crate::codes;
use shieldcore_domain::{AttestationStatus, Decision, IntegritySignals, PinSet, PinVerdict, Policy};
use shieldcore_types::{ConditionsDocument, PolicyDocument, RuleDocument};
use std::slice;
use thiserror::Error;
use time::OffsetDateTime;

pub const MAX_STR_LEN: usize = 64 * 1024;
pub const MAX_POLICY_JSON_LEN: usize = 1024 * 1024;
pub const MAX_RULES: usize = 4096;
pub const MAX_PINS: usize = 256;

#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("{0}: null pointer")]
    NullPointer(&'static str),

    #[error("{field}: length {len} exceeds {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{0}: misaligned pointer")]
    Misaligned(&'static str),

    #[error("{0}: not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("{0}: interior NUL byte")]
    InteriorNul(&'static str),

    #[error("{0}: must not be empty")]
    Empty(&'static str),

    #[error("{field}: invalid code {value}")]
    InvalidCode { field: &'static str, value: i64 },

    #[error("{0}: timestamp out of range")]
    InvalidTimestamp(&'static str),

    #[error("policy rejected: {0}")]
    Policy(String),
}

/// Owned copy of an evaluation request.
#[derive(Debug)]
pub(crate) struct EvaluateCall {
    pub policy: Policy,
    pub action: String,
    pub signals: IntegritySignals,
    pub attestation: Option<AttestationStatus>,
    pub risk_score: u32,
}

impl EvaluateCall {
    pub fn decide(&self) -> Decision {
        shieldcore_domain::evaluate(
            &self.policy,
            &self.action,
            &self.signals,
            self.attestation,
            self.risk_score,
        )
    }
}

/// Owned copy of a pin check request.
#[derive(Debug)]
pub(crate) struct PinCall {
    pub pins: PinSet,
    pub presented_hash: String,
    pub now: OffsetDateTime,
}

impl PinCall {
    pub fn verdict(&self) -> PinVerdict {
        self.pins.check(&self.presented_hash, self.now)
    }
}

/// # Safety
/// A non-null `s.ptr` must point to `s.len` readable bytes.
unsafe fn read_bytes<'a>(
    s: ShieldStr,
    max: usize,
    field: &'static str,
) -> Result<Option<&'a [u8]>, MarshalError> {
    if s.ptr.is_null() {
        return if s.len == 0 {
            Ok(None)
        } else {
            Err(MarshalError::NullPointer(field))
        };
    }
    if s.len > max {
        return Err(MarshalError::TooLong {
            field,
            len: s.len,
            max,
        });
    }
    Ok(Some(unsafe { slice::from_raw_parts(s.ptr, s.len) }))
}

fn decode_text(bytes: &[u8], field: &'static str) -> Result<String, MarshalError> {
    let text = std::str::from_utf8(bytes).map_err(|_| MarshalError::InvalidUtf8(field))?;
    if text.contains('\0') {
        return Err(MarshalError::InteriorNul(field));
    }
    Ok(text.to_owned())
}

/// # Safety
/// See [`read_bytes`].
pub(crate) unsafe fn read_opt_str(
    s: ShieldStr,
    field: &'static str,
) -> Result<Option<String>, MarshalError> {
    unsafe { read_bytes(s, MAX_STR_LEN, field) }?
        .map(|bytes| decode_text(bytes, field))
        .transpose()
}

/// # Safety
/// See [`read_bytes`].
pub(crate) unsafe fn read_str(s: ShieldStr, field: &'static str) -> Result<String, MarshalError> {
    unsafe { read_opt_str(s, field) }?.ok_or(MarshalError::NullPointer(field))
}

/// # Safety
/// A non-null `ptr` must point to `len` initialized values of `T`.
unsafe fn read_array<'a, T>(
    ptr: *const T,
    len: usize,
    max: usize,
    field: &'static str,
) -> Result<&'a [T], MarshalError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(MarshalError::NullPointer(field));
    }
    if len > max {
        return Err(MarshalError::TooLong { field, len, max });
    }
    if !ptr.is_aligned() {
        return Err(MarshalError::Misaligned(field));
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

/// # Safety
/// A non-null `ptr` must point to an initialized `T`.
unsafe fn read_struct<'a, T>(ptr: *const T, field: &'static str) -> Result<&'a T, MarshalError> {
    if !ptr.is_aligned() {
        return Err(MarshalError::Misaligned(field));
    }
    unsafe { ptr.as_ref() }.ok_or(MarshalError::NullPointer(field))
}

/// # Safety
/// `ptr` must be null or point to a `ShieldPolicy` whose strings and rules obey the ABI contract.
pub(crate) unsafe fn read_policy(ptr: *const ShieldPolicy) -> Result<Policy, MarshalError> {
    let raw = unsafe { read_struct(ptr, "policy") }?;
    let rules = unsafe { read_array(raw.rules, raw.rule_count, MAX_RULES, "policy.rules") }?;

    let doc = PolicyDocument {
        policy_id: unsafe { read_str(raw.policy_id, "policy.policy_id") }?,
        app_id: unsafe { read_str(raw.app_id, "policy.app_id") }?,
        app_version: unsafe { read_str(raw.app_version, "policy.app_version") }?,
        env: unsafe { read_str(raw.env, "policy.env") }?,
        rules: rules
            .iter()
            .map(|r| unsafe { read_rule(r) })
            .collect::<Result<Vec<_>, _>>()?,
        signature: unsafe { read_opt_str(raw.signature, "policy.signature") }?,
        issued_at: unsafe { read_str(raw.issued_at, "policy.issued_at") }?,
    };

    shieldcore_types::validate_policy(&doc).map_err(|e| MarshalError::Policy(e.to_string()))?;
    Ok(Policy::from(doc))
}

/// # Safety
/// Strings inside `rule` must obey the ABI contract.
unsafe fn read_rule(rule: &ShieldRule) -> Result<RuleDocument, MarshalError> {
    Ok(RuleDocument {
        action: unsafe { read_str(rule.action, "rule.action") }?,
        decision: codes::decision_from_code(rule.decision, "rule.decision")?,
        conditions: unsafe { read_conditions(&rule.conditions) }?,
    })
}

/// # Safety
/// `c.app_version` must obey the ABI contract.
unsafe fn read_conditions(c: &ShieldConditions) -> Result<ConditionsDocument, MarshalError> {
    Ok(ConditionsDocument {
        attestation: codes::attestation_from_code(c.attestation, "conditions.attestation")?,
        debugger: codes::optional_bool_from_code(c.debugger, "conditions.debugger")?,
        hooking: codes::optional_bool_from_code(c.hooking, "conditions.hooking")?,
        proxy_detected: codes::optional_bool_from_code(
            c.proxy_detected,
            "conditions.proxy_detected",
        )?,
        app_version: unsafe { read_opt_str(c.app_version, "conditions.app_version") }?,
        risk_score_gte: codes::optional_u32_from_code(
            c.risk_score_gte,
            "conditions.risk_score_gte",
        )?,
    })
}

/// # Safety
/// `s` must obey the ABI contract.
pub(crate) unsafe fn read_policy_json(s: ShieldStr) -> Result<Policy, MarshalError> {
    let bytes = unsafe { read_bytes(s, MAX_POLICY_JSON_LEN, "policy_json") }?
        .ok_or(MarshalError::NullPointer("policy_json"))?;
    let text = decode_text(bytes, "policy_json")?;
    shieldcore_app::parse_policy(&text).map_err(|e| MarshalError::Policy(e.to_string()))
}

/// # Safety
/// `ptr` must be null or point to an initialized `ShieldSignals`.
pub(crate) unsafe fn read_signals(
    ptr: *const ShieldSignals,
) -> Result<IntegritySignals, MarshalError> {
    let raw = unsafe { read_struct(ptr, "signals") }?;
    Ok(IntegritySignals {
        jailbreak: codes::flag_from_code(raw.jailbreak, "signals.jailbreak")?,
        root: codes::flag_from_code(raw.root, "signals.root")?,
        debugger: codes::flag_from_code(raw.debugger, "signals.debugger")?,
        hooking: codes::flag_from_code(raw.hooking, "signals.hooking")?,
        proxy_detected: codes::flag_from_code(raw.proxy_detected, "signals.proxy_detected")?,
    })
}

/// # Safety
/// `action` must obey the ABI contract.
pub(crate) unsafe fn read_action(action: ShieldStr) -> Result<String, MarshalError> {
    let action = unsafe { read_str(action, "action") }?;
    if action.is_empty() {
        return Err(MarshalError::Empty("action"));
    }
    Ok(action)
}

/// # Safety
/// A non-null `arr.ptr` must point to `arr.len` `ShieldStr` values obeying the ABI contract.
unsafe fn read_hashes(arr: ShieldStrArray, field: &'static str) -> Result<Vec<String>, MarshalError> {
    let items = unsafe { read_array(arr.ptr, arr.len, MAX_PINS, field) }?;
    items
        .iter()
        .map(|s| {
            let hash = unsafe { read_str(*s, field) }?;
            if hash.trim().is_empty() {
                return Err(MarshalError::Empty(field));
            }
            Ok(hash)
        })
        .collect()
}

/// # Safety
/// `ptr` must be null or point to a `ShieldPinSet` whose arrays obey the ABI contract.
pub(crate) unsafe fn read_pin_set(ptr: *const ShieldPinSet) -> Result<PinSet, MarshalError> {
    let raw = unsafe { read_struct(ptr, "pin_set") }?;
    let mut pins = PinSet::new(
        unsafe { read_hashes(raw.current, "pin_set.current") }?,
        unsafe { read_hashes(raw.previous, "pin_set.previous") }?,
    );

    if raw.rotated_at_unix_seconds >= 0 {
        pins.rotated_at = Some(unix_time(
            raw.rotated_at_unix_seconds,
            "pin_set.rotated_at_unix_seconds",
        )?);
    }
    if raw.rotation_window_days >= 0 {
        let days = i32::try_from(raw.rotation_window_days).map_err(|_| {
            MarshalError::InvalidCode {
                field: "pin_set.rotation_window_days",
                value: raw.rotation_window_days,
            }
        })?;
        pins.rotation_window_days = Some(days);
    }
    Ok(pins)
}

pub(crate) fn unix_time(seconds: i64, field: &'static str) -> Result<OffsetDateTime, MarshalError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| MarshalError::InvalidTimestamp(field))
}
