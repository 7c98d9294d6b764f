//! Pure security decisions (no IO, no clock, no randomness).
//!
//! Input: a policy or pin set constructed elsewhere, plus per-call observations.
//! Output: a decision or an allow/deny verdict, with the reason it was reached.

#![forbid(unsafe_code)]

pub mod model;
pub mod pinning;
pub mod risk;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{DEFAULT_DECISION, DecisionReason, Evaluation, evaluate, evaluate_traced};
pub use model::{
    AttestationStatus, Decision, IntegritySignals, Policy, PolicyConditions, PolicyRule,
};
pub use pinning::{PinSet, PinVerdict};
pub use risk::RiskWeights;
