//! C ABI for shieldcore (ABI version 1).
//!
//! Entry points are stateless and thread-safe. Each call validates its arguments, copies them
//! into an owned snapshot, evaluates, and drops the snapshot before returning. Nothing the caller
//! passes is retained.
//!
//! No failure crosses the boundary as an unwind or an error value. Evaluation failures return
//! `SHIELD_DECISION_DENY`; pin check failures return `0` (not allowed). See `include/shieldcore.h`.

pub mod abi;
pub mod codes;
mod marshal;

pub use abi::{
    ShieldConditions, ShieldPinSet, ShieldPolicy, ShieldRule, ShieldSignals, ShieldStr,
    ShieldStrArray,
};
pub use marshal::{MAX_PINS, MAX_POLICY_JSON_LEN, MAX_RULES, MAX_STR_LEN, MarshalError};

use marshal::{EvaluateCall, PinCall};
use std::panic::{self, AssertUnwindSafe};

/// Run `op`, mapping malformed input and panics to `sentinel`.
fn guarded<T>(entry: &'static str, sentinel: T, op: impl FnOnce() -> Result<T, MarshalError>) -> T {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            tracing::warn!(entry, error = %err, "rejected malformed input");
            sentinel
        }
        Err(_) => {
            tracing::error!(entry, "panic caught at ABI boundary");
            sentinel
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn shieldcore_abi_version() -> u32 {
    codes::ABI_VERSION
}

/// Evaluate a policy passed as structs. Returns a decision code.
///
/// `attestation_code` is `-1` when the host has no attestation result.
///
/// # Safety
/// `policy` and `signals` must be null or point to initialized values laid out as in
/// `shieldcore.h`. Every non-null string or array pointer reachable from them, and `action`,
/// must be readable for its stated length for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shieldcore_evaluate_policy(
    policy: *const ShieldPolicy,
    action: ShieldStr,
    signals: *const ShieldSignals,
    attestation_code: i32,
    risk_score: u32,
) -> i32 {
    guarded("shieldcore_evaluate_policy", codes::DECISION_DENY, || {
        let call = EvaluateCall {
            policy: unsafe { marshal::read_policy(policy) }?,
            action: unsafe { marshal::read_action(action) }?,
            signals: unsafe { marshal::read_signals(signals) }?,
            attestation: codes::attestation_from_code(attestation_code, "attestation_code")?,
            risk_score,
        };
        Ok(codes::decision_to_code(call.decide()))
    })
}

/// Evaluate a policy passed as its JSON wire document. Returns a decision code.
///
/// # Safety
/// As for [`shieldcore_evaluate_policy`]; `policy_json` must be readable for its length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shieldcore_evaluate_policy_json(
    policy_json: ShieldStr,
    action: ShieldStr,
    signals: *const ShieldSignals,
    attestation_code: i32,
    risk_score: u32,
) -> i32 {
    guarded("shieldcore_evaluate_policy_json", codes::DECISION_DENY, || {
        let call = EvaluateCall {
            policy: unsafe { marshal::read_policy_json(policy_json) }?,
            action: unsafe { marshal::read_action(action) }?,
            signals: unsafe { marshal::read_signals(signals) }?,
            attestation: codes::attestation_from_code(attestation_code, "attestation_code")?,
            risk_score,
        };
        Ok(codes::decision_to_code(call.decide()))
    })
}

/// Check a presented SPKI hash. Returns `1` when allowed and `0` otherwise.
///
/// `now_unix_seconds` is the caller's clock; the library never reads one.
///
/// # Safety
/// `pin_set` must be null or point to an initialized `ShieldPinSet` whose arrays and strings are
/// readable for their stated lengths. `presented_hash` must be readable for its length.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shieldcore_pinning_is_allowed(
    pin_set: *const ShieldPinSet,
    presented_hash: ShieldStr,
    now_unix_seconds: i64,
) -> i32 {
    guarded("shieldcore_pinning_is_allowed", codes::PIN_DENIED, || {
        let call = PinCall {
            pins: unsafe { marshal::read_pin_set(pin_set) }?,
            presented_hash: unsafe { marshal::read_str(presented_hash, "presented_hash") }?,
            now: marshal::unix_time(now_unix_seconds, "now_unix_seconds")?,
        };
        let verdict = call.verdict();
        if !verdict.is_allowed() {
            tracing::warn!(verdict = verdict.code(), "pin rejected");
        }
        Ok(if verdict.is_allowed() {
            codes::PIN_ALLOWED
        } else {
            codes::PIN_DENIED
        })
    })
}
