use crate::model::{Decision, IntegritySignals, Policy, PolicyConditions, PolicyRule};

pub fn clean_signals() -> IntegritySignals {
    IntegritySignals::default()
}

pub fn rule(action: &str, decision: Decision, conditions: PolicyConditions) -> PolicyRule {
    PolicyRule {
        action: action.to_string(),
        decision,
        conditions,
    }
}

pub fn policy(rules: Vec<PolicyRule>) -> Policy {
    Policy {
        policy_id: "policy-test".to_string(),
        app_id: "fintech.mobile".to_string(),
        app_version: "1.0.0".to_string(),
        env: "test".to_string(),
        rules,
        issued_at: "2026-01-01T00:00:00Z".to_string(),
    }
}
