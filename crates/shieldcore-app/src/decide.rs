//! The decide use case: score the observation (unless the host already did) and evaluate.

use shieldcore_domain::{
    AttestationStatus, Decision, DecisionReason, IntegritySignals, Policy, RiskWeights, risk,
};

/// Input for one decision.
#[derive(Clone, Debug)]
pub struct DecideInput<'a> {
    pub policy: &'a Policy,
    pub action: &'a str,
    pub signals: IntegritySignals,
    pub attestation: Option<AttestationStatus>,
    /// Host-supplied score. When `None` the score is computed from `weights`.
    pub risk_score: Option<u32>,
    /// Extra host findings (suspicious libraries and the like) fed into the computed score.
    pub finding_count: usize,
    pub weights: RiskWeights,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecideOutput {
    pub decision: Decision,
    pub reason: DecisionReason,
    pub risk_score: u32,
}

pub fn decide(input: &DecideInput<'_>) -> DecideOutput {
    let risk_score = input.risk_score.unwrap_or_else(|| {
        risk::score(
            &input.signals,
            input.attestation,
            input.finding_count,
            &input.weights,
        )
    });

    let eval = shieldcore_domain::evaluate_traced(
        input.policy,
        input.action,
        &input.signals,
        input.attestation,
        risk_score,
    );

    tracing::debug!(
        policy_id = %input.policy.policy_id,
        action = input.action,
        decision = eval.decision.as_wire(),
        reason = eval.reason.code(),
        risk_score,
        "policy evaluated"
    );

    DecideOutput {
        decision: eval.decision,
        reason: eval.reason,
        risk_score,
    }
}

/// Process exit code for a decision. `1` is reserved for errors.
pub fn decision_exit_code(decision: Decision) -> i32 {
    match decision {
        Decision::Allow => 0,
        Decision::Deny => 2,
        Decision::StepUp => 3,
        Decision::Degrade => 4,
    }
}
