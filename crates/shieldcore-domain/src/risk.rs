//! Additive risk scoring from integrity signals.
//!
//! Hosts may supply their own score to the evaluator; this is the shared default.

use crate::model::{AttestationStatus, IntegritySignals};

pub const MAX_RISK_SCORE: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiskWeights {
    pub jailbreak_or_root: u32,
    pub debugger_or_hooking: u32,
    pub proxy_detected: u32,
    pub attestation_fail: u32,
    /// Added once per host-reported finding (e.g. a suspicious library).
    pub per_finding: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            jailbreak_or_root: 40,
            debugger_or_hooking: 30,
            proxy_detected: 20,
            attestation_fail: 30,
            per_finding: 5,
        }
    }
}

/// Score in `0..=MAX_RISK_SCORE`. Additions saturate.
pub fn score(
    signals: &IntegritySignals,
    attestation: Option<AttestationStatus>,
    finding_count: usize,
    weights: &RiskWeights,
) -> u32 {
    let mut total = 0u32;
    if signals.jailbreak || signals.root {
        total = total.saturating_add(weights.jailbreak_or_root);
    }
    if signals.debugger || signals.hooking {
        total = total.saturating_add(weights.debugger_or_hooking);
    }
    if signals.proxy_detected {
        total = total.saturating_add(weights.proxy_detected);
    }
    if attestation == Some(AttestationStatus::Fail) {
        total = total.saturating_add(weights.attestation_fail);
    }
    let findings = u32::try_from(finding_count).unwrap_or(u32::MAX);
    total = total.saturating_add(findings.saturating_mul(weights.per_finding));

    total.min(MAX_RISK_SCORE)
}
