//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - first-match precedence and the Allow default
//! - sparse predicate semantics (absent never fails)
//! - wire round trips keeping order and optionality
//! - pin validation and the rotation window
//! - risk score bounds

use crate::engine::{DecisionReason, evaluate, evaluate_traced};
use crate::model::{
    AttestationStatus, Decision, IntegritySignals, Policy, PolicyConditions, PolicyRule,
};
use crate::pinning::PinSet;
use crate::risk::{self, MAX_RISK_SCORE, RiskWeights};
use proptest::prelude::*;
use shieldcore_types::PolicyDocument;
use time::{Duration, OffsetDateTime};

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

const ACTIONS: [&str; 4] = ["login", "transfer", "view_card", "export"];

fn arb_action() -> impl Strategy<Value = String> {
    prop::sample::select(ACTIONS.to_vec()).prop_map(str::to_string)
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop::sample::select(Decision::ALL.to_vec())
}

fn arb_attestation() -> impl Strategy<Value = AttestationStatus> {
    prop_oneof![
        Just(AttestationStatus::Unknown),
        Just(AttestationStatus::Pass),
        Just(AttestationStatus::Fail),
    ]
}

fn arb_signals() -> impl Strategy<Value = IntegritySignals> {
    any::<[bool; 5]>().prop_map(|[jailbreak, root, debugger, hooking, proxy_detected]| {
        IntegritySignals {
            jailbreak,
            root,
            debugger,
            hooking,
            proxy_detected,
        }
    })
}

fn arb_app_version() -> impl Strategy<Value = String> {
    prop_oneof![Just("1.0.0".to_string()), Just("2.0.0".to_string())]
}

fn arb_conditions() -> impl Strategy<Value = PolicyConditions> {
    (
        prop::option::of(arb_attestation()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(arb_app_version()),
        prop::option::of(0u32..=120),
    )
        .prop_map(
            |(attestation_status, debugger, hooking, proxy_detected, app_version, risk)| {
                PolicyConditions {
                    attestation_status,
                    debugger,
                    hooking,
                    proxy_detected,
                    app_version,
                    risk_score_at_least: risk,
                }
            },
        )
}

fn arb_rule() -> impl Strategy<Value = PolicyRule> {
    (arb_action(), arb_decision(), arb_conditions()).prop_map(|(action, decision, conditions)| {
        PolicyRule {
            action,
            decision,
            conditions,
        }
    })
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    (prop::collection::vec(arb_rule(), 0..12), arb_app_version()).prop_map(|(rules, version)| {
        Policy {
            policy_id: "prop".to_string(),
            app_id: "fintech.mobile".to_string(),
            app_version: version,
            env: "test".to_string(),
            rules,
            issued_at: "2026-01-01T00:00:00Z".to_string(),
        }
    })
}

/// Everything a single evaluation call takes besides the policy.
fn arb_call() -> impl Strategy<Value = (String, IntegritySignals, Option<AttestationStatus>, u32)> {
    (
        arb_action(),
        arb_signals(),
        prop::option::of(arb_attestation()),
        0u32..=120,
    )
}

fn arb_hash() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9+/]{8,12}=").unwrap()
}

// ============================================================================
// Property tests: evaluator
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig {
        max_global_rejects: 65536,
        ..ProptestConfig::default()
    })]

    /// Same inputs, same output.
    #[test]
    fn evaluation_is_deterministic(policy in arb_policy(), (action, signals, att, risk) in arb_call()) {
        let a = evaluate_traced(&policy, &action, &signals, att, risk);
        let b = evaluate_traced(&policy, &action, &signals, att, risk);
        prop_assert_eq!(a, b);
    }

    /// The winning rule targets the action, matches, and no earlier rule for the action matches.
    #[test]
    fn winner_is_the_first_match(policy in arb_policy(), (action, signals, att, risk) in arb_call()) {
        let eval = evaluate_traced(&policy, &action, &signals, att, risk);
        let matches = |r: &PolicyRule| {
            r.action == action && r.conditions.matches(&signals, att, risk, &policy.app_version)
        };

        match eval.reason {
            DecisionReason::RuleMatched { index } => {
                let winner = &policy.rules[index];
                prop_assert!(matches(winner));
                prop_assert_eq!(eval.decision, winner.decision);
                prop_assert!(!policy.rules[..index].iter().any(matches));
            }
            DecisionReason::NoRuleForAction => {
                prop_assert_eq!(eval.decision, Decision::Allow);
                prop_assert!(!policy.rules.iter().any(|r| r.action == action));
            }
            DecisionReason::NoConditionsMatched => {
                prop_assert_eq!(eval.decision, Decision::Allow);
                prop_assert!(policy.rules.iter().any(|r| r.action == action));
                prop_assert!(!policy.rules.iter().any(matches));
            }
        }
    }

    /// Actions that no rule names are always allowed.
    #[test]
    fn untargeted_action_is_allowed(policy in arb_policy(), (_, signals, att, risk) in arb_call()) {
        let eval = evaluate_traced(&policy, "never_named_action", &signals, att, risk);
        prop_assert_eq!(eval.decision, Decision::Allow);
        prop_assert_eq!(eval.reason, DecisionReason::NoRuleForAction);
    }

    /// Rules for other actions never influence the outcome.
    #[test]
    fn other_actions_are_irrelevant(
        policy in arb_policy(),
        extra in prop::collection::vec(arb_rule(), 0..6),
        (action, signals, att, risk) in arb_call(),
    ) {
        let before = evaluate(&policy, &action, &signals, att, risk);

        let mut widened = policy.clone();
        for (i, mut rule) in extra.into_iter().enumerate() {
            rule.action = format!("unrelated_{i}");
            let at = i % (widened.rules.len() + 1);
            widened.rules.insert(at, rule);
        }
        prop_assert_eq!(evaluate(&widened, &action, &signals, att, risk), before);
    }

    /// Dropping a predicate from a matching rule keeps it matching.
    #[test]
    fn absent_predicate_never_fails(
        conditions in arb_conditions(),
        (_, signals, att, risk) in arb_call(),
        version in arb_app_version(),
        which in 0usize..6,
    ) {
        prop_assume!(conditions.matches(&signals, att, risk, &version));

        let mut weaker = conditions.clone();
        match which {
            0 => weaker.attestation_status = None,
            1 => weaker.debugger = None,
            2 => weaker.hooking = None,
            3 => weaker.proxy_detected = None,
            4 => weaker.app_version = None,
            _ => weaker.risk_score_at_least = None,
        }
        prop_assert!(weaker.matches(&signals, att, risk, &version));
    }

    /// An empty condition set matches any observation.
    #[test]
    fn empty_conditions_always_match((_, signals, att, risk) in arb_call(), version in arb_app_version()) {
        prop_assert!(PolicyConditions::default().matches(&signals, att, risk, &version));
    }

    /// `risk_score_at_least` is an inclusive bound.
    #[test]
    fn risk_threshold_is_inclusive(threshold in 0u32..=100, score in 0u32..=100) {
        let c = PolicyConditions {
            risk_score_at_least: Some(threshold),
            ..PolicyConditions::default()
        };
        prop_assert_eq!(
            c.matches(&IntegritySignals::default(), None, score, "1.0.0"),
            score >= threshold
        );
    }

    /// Serializing to the wire and parsing back is the identity on the model.
    #[test]
    fn wire_round_trip_is_identity(policy in arb_policy()) {
        let json = serde_json::to_string(&PolicyDocument::from(&policy)).unwrap();
        let parsed = shieldcore_types::parse_policy_json(&json).unwrap();
        prop_assert_eq!(Policy::from(parsed), policy);
    }
}

// ============================================================================
// Property tests: pinning
// ============================================================================

proptest! {
    #[test]
    fn current_pins_are_always_allowed(
        current in prop::collection::btree_set(arb_hash(), 1..5),
        previous in prop::collection::btree_set(arb_hash(), 0..5),
        offset_days in -400i64..400,
    ) {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000 + offset_days);
        let pins = PinSet {
            current: current.clone(),
            previous,
            rotated_at: Some(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)),
            rotation_window_days: Some(30),
        };
        for hash in &current {
            prop_assert!(pins.is_allowed(hash, now));
        }
    }

    #[test]
    fn unknown_hash_denied_unless_pinning_disabled(
        current in prop::collection::btree_set(arb_hash(), 0..5),
        previous in prop::collection::btree_set(arb_hash(), 0..5),
    ) {
        let pins = PinSet { current, previous, rotated_at: None, rotation_window_days: None };
        let allowed = pins.is_allowed("not-a-pin", OffsetDateTime::UNIX_EPOCH);
        prop_assert_eq!(allowed, pins.is_disabled());
    }

    #[test]
    fn previous_pin_follows_the_window(
        hash in arb_hash(),
        window in 0i32..60,
        elapsed_hours in 0i64..(24 * 90),
    ) {
        let rotated = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000);
        let now = rotated + Duration::hours(elapsed_hours);
        let pins = PinSet::new(["current-pin"], [hash.clone()]).with_rotation(rotated, window);

        let expected = Duration::hours(elapsed_hours) <= Duration::days(i64::from(window));
        prop_assert_eq!(pins.is_allowed(&hash, now), expected);

        let hard_cutover = PinSet::new(["current-pin"], [hash.clone()]);
        prop_assert!(!hard_cutover.is_allowed(&hash, now));
    }
}

// ============================================================================
// Property tests: risk
// ============================================================================

proptest! {
    #[test]
    fn risk_score_is_bounded(
        signals in arb_signals(),
        att in prop::option::of(arb_attestation()),
        findings in 0usize..1000,
    ) {
        let s = risk::score(&signals, att, findings, &RiskWeights::default());
        prop_assert!(s <= MAX_RISK_SCORE);
    }
}
