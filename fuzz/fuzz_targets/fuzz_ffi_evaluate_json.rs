//! Fuzz target for the JSON evaluation entry point of the C ABI.
//!
//! Goal: Any document, action, and code combination returns one of the four decision codes.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_ffi_evaluate_json
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shieldcore_ffi::codes::{DECISION_ALLOW, DECISION_DENY};
use shieldcore_ffi::{ShieldSignals, ShieldStr, shieldcore_evaluate_policy_json};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    policy_json: &'a [u8],
    action: &'a [u8],
    flags: [i32; 5],
    attestation: i32,
    risk_score: u32,
}

fn raw(bytes: &[u8]) -> ShieldStr {
    ShieldStr {
        ptr: bytes.as_ptr(),
        len: bytes.len(),
    }
}

fuzz_target!(|input: Input<'_>| {
    let [jailbreak, root, debugger, hooking, proxy_detected] = input.flags;
    let signals = ShieldSignals {
        jailbreak,
        root,
        debugger,
        hooking,
        proxy_detected,
    };

    let decision = unsafe {
        shieldcore_evaluate_policy_json(
            raw(input.policy_json),
            raw(input.action),
            &signals,
            input.attestation,
            input.risk_score,
        )
    };
    assert!((DECISION_ALLOW..=DECISION_DENY).contains(&decision));
});
