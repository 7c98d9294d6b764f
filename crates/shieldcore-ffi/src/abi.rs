//! `#[repr(C)]` types shared with `include/shieldcore.h`.
//!
//! Every pointer is caller-owned and only read for the duration of a call.

use std::ptr;

/// Borrowed UTF-8 string. Not NUL-terminated; `len` is in bytes.
///
/// A null `ptr` means "absent" for optional fields and is rejected for required ones.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl ShieldStr {
    pub const NULL: ShieldStr = ShieldStr {
        ptr: ptr::null(),
        len: 0,
    };

    /// Borrow a Rust string. The result must not outlive `s`.
    pub fn borrowed(s: &str) -> Self {
        ShieldStr {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldStrArray {
    pub ptr: *const ShieldStr,
    pub len: usize,
}

impl ShieldStrArray {
    pub const EMPTY: ShieldStrArray = ShieldStrArray {
        ptr: ptr::null(),
        len: 0,
    };

    pub fn borrowed(items: &[ShieldStr]) -> Self {
        ShieldStrArray {
            ptr: items.as_ptr(),
            len: items.len(),
        }
    }
}

/// Observed integrity flags. Each field is `0` or `1`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ShieldSignals {
    pub jailbreak: i32,
    pub root: i32,
    pub debugger: i32,
    pub hooking: i32,
    pub proxy_detected: i32,
}

/// Sparse rule predicates. `-1` (or a null string) means the predicate is absent.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldConditions {
    /// Attestation code, or `-1`.
    pub attestation: i32,
    pub debugger: i32,
    pub hooking: i32,
    pub proxy_detected: i32,
    pub app_version: ShieldStr,
    /// Any negative value means absent.
    pub risk_score_gte: i64,
}

impl ShieldConditions {
    pub const NONE: ShieldConditions = ShieldConditions {
        attestation: -1,
        debugger: -1,
        hooking: -1,
        proxy_detected: -1,
        app_version: ShieldStr::NULL,
        risk_score_gte: -1,
    };
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldRule {
    pub action: ShieldStr,
    /// Decision code.
    pub decision: i32,
    pub conditions: ShieldConditions,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldPolicy {
    pub policy_id: ShieldStr,
    pub app_id: ShieldStr,
    pub app_version: ShieldStr,
    pub env: ShieldStr,
    pub issued_at: ShieldStr,
    /// Optional; never verified.
    pub signature: ShieldStr,
    pub rules: *const ShieldRule,
    pub rule_count: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShieldPinSet {
    pub current: ShieldStrArray,
    pub previous: ShieldStrArray,
    /// Unix seconds; any negative value means absent.
    pub rotated_at_unix_seconds: i64,
    /// Any negative value means no rotation window.
    pub rotation_window_days: i64,
}
