//! Explain registry for reason codes.
//!
//! Maps reason codes to human-readable explanations with guidance for policy authors and host
//! integrators.

use crate::ids;

/// Explanation entry for a reason code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the code.
    pub title: &'static str,
    /// When the core emits it and what it means.
    pub description: &'static str,
    /// What a policy author or host should do about it.
    pub remediation: &'static str,
}

/// Look up an explanation by reason code.
///
/// Returns `None` if the code is not recognized.
pub fn lookup_explanation(code: &str) -> Option<Explanation> {
    match code {
        ids::REASON_RULE_MATCHED => Some(explain_rule_matched()),
        ids::REASON_NO_RULE_FOR_ACTION => Some(explain_no_rule_for_action()),
        ids::REASON_NO_CONDITIONS_MATCHED => Some(explain_no_conditions_matched()),

        ids::REASON_PINNING_DISABLED => Some(explain_pinning_disabled()),
        ids::REASON_CURRENT_PIN => Some(explain_current_pin()),
        ids::REASON_PREVIOUS_PIN_IN_WINDOW => Some(explain_previous_pin_in_window()),
        ids::REASON_PREVIOUS_PIN_EXPIRED => Some(explain_previous_pin_expired()),
        ids::REASON_UNPINNED => Some(explain_unpinned()),

        ids::ORIGIN_REMOTE => Some(explain_origin_remote()),
        ids::ORIGIN_BUNDLED_FALLBACK => Some(explain_origin_bundled_fallback()),

        ids::REASON_CONFIGURATION_MISSING => Some(explain_configuration_missing()),
        ids::REASON_MALFORMED_INPUT => Some(explain_malformed_input()),
        ids::REASON_POLICY_UNAVAILABLE => Some(explain_policy_unavailable()),

        _ => None,
    }
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::REASON_RULE_MATCHED,
        ids::REASON_NO_RULE_FOR_ACTION,
        ids::REASON_NO_CONDITIONS_MATCHED,
        ids::REASON_PINNING_DISABLED,
        ids::REASON_CURRENT_PIN,
        ids::REASON_PREVIOUS_PIN_IN_WINDOW,
        ids::REASON_PREVIOUS_PIN_EXPIRED,
        ids::REASON_UNPINNED,
        ids::ORIGIN_REMOTE,
        ids::ORIGIN_BUNDLED_FALLBACK,
        ids::REASON_CONFIGURATION_MISSING,
        ids::REASON_MALFORMED_INPUT,
        ids::REASON_POLICY_UNAVAILABLE,
    ]
}

// --- Evaluation ---

fn explain_rule_matched() -> Explanation {
    Explanation {
        title: "Rule Matched",
        description: "\
A rule targeting the requested action had all of its present predicates satisfied.
Rules are scanned in document order and the first match decides; later rules for
the same action are never consulted.",
        remediation: "\
If the wrong rule won, reorder the policy: put the more specific rule (more
predicates, harsher decision) before the broader one.",
    }
}

fn explain_no_rule_for_action() -> Explanation {
    Explanation {
        title: "No Rule For Action (default Allow)",
        description: "\
The policy contains no rule whose action equals the requested action, so the
decision is Allow. This fail-open default is deliberate: unknown actions are not
gated until a policy names them.",
        remediation: "\
Add a rule for the action. A rule with no conditions acts as a catch-all, e.g.

    { \"action\": \"transfer\", \"decision\": \"STEP_UP\" }

placed last among the rules for that action.",
    }
}

fn explain_no_conditions_matched() -> Explanation {
    Explanation {
        title: "No Conditions Matched (default Allow)",
        description: "\
At least one rule targets the action, but none of them had all predicates
satisfied by the supplied signals, attestation, and risk score. The decision is
Allow.",
        remediation: "\
End the action's rule list with an unconditional rule if anything other than
Allow should apply when no specific rule matches.",
    }
}

// --- Pinning ---

fn explain_pinning_disabled() -> Explanation {
    Explanation {
        title: "Pinning Disabled",
        description: "\
Both the current and previous pin sets are empty. With no pins configured every
presented key is accepted.",
        remediation: "\
Configure at least one SPKI hash under [pinning].current to enforce pinning.",
    }
}

fn explain_current_pin() -> Explanation {
    Explanation {
        title: "Current Pin",
        description: "The presented SPKI hash is in the current pin set.",
        remediation: "None needed.",
    }
}

fn explain_previous_pin_in_window() -> Explanation {
    Explanation {
        title: "Previous Pin Within Rotation Window",
        description: "\
The presented SPKI hash was retired by a pin rotation but is still inside the
grace window: now - rotated_at <= rotation_window_days.",
        remediation: "\
Finish rolling the server certificate before the window closes; after that the
previous pin is rejected.",
    }
}

fn explain_previous_pin_expired() -> Explanation {
    Explanation {
        title: "Previous Pin Outside Rotation Window",
        description: "\
The presented SPKI hash is only in the previous pin set and either no rotation
window is configured (hard cutover), rotated_at is missing, or the window has
elapsed.",
        remediation: "\
Serve a certificate whose key is in the current pin set, or extend
rotation_window_days if the rollout is still in progress.",
    }
}

fn explain_unpinned() -> Explanation {
    Explanation {
        title: "Unpinned Key",
        description: "\
The presented SPKI hash is in neither pin set. This is the signature of TLS
interception or a misconfigured server.",
        remediation: "\
Treat the connection as compromised. If the key change is legitimate, publish a
configuration with the new hash in [pinning].current.",
    }
}

// --- Provenance ---

fn explain_origin_remote() -> Explanation {
    Explanation {
        title: "Remote Policy",
        description: "The policy in effect was fetched from the policy service and parsed successfully.",
        remediation: "None needed.",
    }
}

fn explain_origin_bundled_fallback() -> Explanation {
    Explanation {
        title: "Bundled Fallback Policy",
        description: "\
Fetching or parsing the remote policy failed and the policy bundled with the app
is in effect. Telemetry and status surfaces must say so.",
        remediation: "\
Check connectivity to the policy service and the validity of the served document.",
    }
}

// --- Failures ---

fn explain_configuration_missing() -> Explanation {
    Explanation {
        title: "Configuration Missing",
        description: "\
No policy or pin set was available for the call. Callers must fail closed (Deny,
or disable the action).",
        remediation: "Load a policy (or bundle one) and configure [pinning] before gating actions.",
    }
}

fn explain_malformed_input() -> Explanation {
    Explanation {
        title: "Malformed Input",
        description: "\
An input could not be interpreted: an unknown condition or attestation value in a
policy document, or a boundary buffer that was null, oversized, not UTF-8, or
whose length disagreed with its contents. The safest outcome, Deny, is returned.",
        remediation: "Fix the host adapter or the policy document; the core never guesses.",
    }
}

fn explain_policy_unavailable() -> Explanation {
    Explanation {
        title: "Policy Unavailable",
        description: "\
The remote fetch failed and no usable bundled policy exists. Sensitive actions
must be denied or stepped up, never allowed by default.",
        remediation: "Ship a bundled fallback policy with the app.",
    }
}
