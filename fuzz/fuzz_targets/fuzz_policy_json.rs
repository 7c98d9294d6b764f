//! Fuzz target for policy document parsing.
//!
//! Goal: The parser should **never panic** on any input, and anything it accepts must
//! survive a serialize/parse round trip unchanged.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_policy_json
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = shieldcore_types::parse_policy_json(text) else {
        return;
    };

    let json = serde_json::to_string(&doc).expect("accepted documents serialize");
    let again = shieldcore_types::parse_policy_json(&json).expect("serialized documents parse");
    assert_eq!(doc, again);
});
