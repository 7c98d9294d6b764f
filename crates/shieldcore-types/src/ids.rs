//! Stable reason codes.
//!
//! Codes are short snake_case discriminators carried in CLI output, logs, and host telemetry.

// Evaluation
pub const REASON_RULE_MATCHED: &str = "rule_matched";
pub const REASON_NO_RULE_FOR_ACTION: &str = "no_rule_for_action";
pub const REASON_NO_CONDITIONS_MATCHED: &str = "no_conditions_matched";

// Pinning
pub const REASON_PINNING_DISABLED: &str = "pinning_disabled";
pub const REASON_CURRENT_PIN: &str = "current_pin";
pub const REASON_PREVIOUS_PIN_IN_WINDOW: &str = "previous_pin_in_window";
pub const REASON_PREVIOUS_PIN_EXPIRED: &str = "previous_pin_expired";
pub const REASON_UNPINNED: &str = "unpinned";

// Policy provenance
pub const ORIGIN_REMOTE: &str = "remote";
pub const ORIGIN_BUNDLED_FALLBACK: &str = "bundled_fallback";

// Failures
pub const REASON_CONFIGURATION_MISSING: &str = "configuration_missing";
pub const REASON_MALFORMED_INPUT: &str = "malformed_input";
pub const REASON_POLICY_UNAVAILABLE: &str = "policy_unavailable";
