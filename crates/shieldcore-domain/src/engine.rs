use crate::model::{AttestationStatus, Decision, IntegritySignals, Policy};
use shieldcore_types::ids;

/// Outcome when no rule decides.
///
/// Fail-open: an action the policy does not gate (or whose rules all miss) is allowed.
/// Policies that need a different fallback end the action's rules with an unconditional rule.
pub const DEFAULT_DECISION: Decision = Decision::Allow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionReason {
    /// `index` is the rule's position in `Policy::rules`.
    RuleMatched { index: usize },
    NoRuleForAction,
    NoConditionsMatched,
}

impl DecisionReason {
    pub fn code(self) -> &'static str {
        match self {
            DecisionReason::RuleMatched { .. } => ids::REASON_RULE_MATCHED,
            DecisionReason::NoRuleForAction => ids::REASON_NO_RULE_FOR_ACTION,
            DecisionReason::NoConditionsMatched => ids::REASON_NO_CONDITIONS_MATCHED,
        }
    }

    pub fn is_default(self) -> bool {
        !matches!(self, DecisionReason::RuleMatched { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub reason: DecisionReason,
}

pub fn evaluate(
    policy: &Policy,
    action: &str,
    signals: &IntegritySignals,
    attestation: Option<AttestationStatus>,
    risk_score: u32,
) -> Decision {
    evaluate_traced(policy, action, signals, attestation, risk_score).decision
}

/// First rule (in policy order) whose action equals `action` and whose conditions all hold wins.
pub fn evaluate_traced(
    policy: &Policy,
    action: &str,
    signals: &IntegritySignals,
    attestation: Option<AttestationStatus>,
    risk_score: u32,
) -> Evaluation {
    let mut targeted = false;

    for (index, rule) in policy.rules.iter().enumerate() {
        if rule.action != action {
            continue;
        }
        targeted = true;

        if rule
            .conditions
            .matches(signals, attestation, risk_score, &policy.app_version)
        {
            return Evaluation {
                decision: rule.decision,
                reason: DecisionReason::RuleMatched { index },
            };
        }
    }

    Evaluation {
        decision: DEFAULT_DECISION,
        reason: if targeted {
            DecisionReason::NoConditionsMatched
        } else {
            DecisionReason::NoRuleForAction
        },
    }
}
