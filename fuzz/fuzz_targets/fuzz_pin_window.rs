//! Fuzz target for pin validation at extreme timestamps and window sizes.
//!
//! Goal: No overflow panics in window arithmetic, and current pins are always allowed.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_pin_window
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shieldcore_ffi::{ShieldPinSet, ShieldStr, ShieldStrArray, shieldcore_pinning_is_allowed};

#[derive(Debug, Arbitrary)]
struct Input {
    rotated_at: i64,
    window_days: i64,
    now: i64,
    present_previous: bool,
}

fuzz_target!(|input: Input| {
    let current = [ShieldStr::borrowed("current-pin")];
    let previous = [ShieldStr::borrowed("previous-pin")];
    let set = ShieldPinSet {
        current: ShieldStrArray::borrowed(&current),
        previous: ShieldStrArray::borrowed(&previous),
        rotated_at_unix_seconds: input.rotated_at,
        rotation_window_days: input.window_days,
    };

    let presented = if input.present_previous {
        "previous-pin"
    } else {
        "current-pin"
    };
    let allowed = unsafe {
        shieldcore_pinning_is_allowed(&set, ShieldStr::borrowed(presented), input.now)
    };
    assert!(allowed == 0 || allowed == 1);

    // Current pins are allowed at every representable time.
    if !input.present_previous && time::OffsetDateTime::from_unix_timestamp(input.now).is_ok() {
        let rotated_ok = input.rotated_at < 0
            || time::OffsetDateTime::from_unix_timestamp(input.rotated_at).is_ok();
        let window_ok = input.window_days < 0 || i32::try_from(input.window_days).is_ok();
        if rotated_ok && window_ok {
            assert_eq!(allowed, 1);
        }
    }
});
