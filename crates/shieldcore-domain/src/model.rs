use shieldcore_types::{ConditionsDocument, PolicyDocument, RuleDocument};

pub use shieldcore_types::{AttestationStatus, Decision, IntegritySignals};

/// An immutable, parsed policy.
///
/// `rules` order is precedence: it is kept exactly as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    pub policy_id: String,
    pub app_id: String,
    pub app_version: String,
    pub env: String,
    pub rules: Vec<PolicyRule>,
    pub issued_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyRule {
    pub action: String,
    pub decision: Decision,
    pub conditions: PolicyConditions,
}

/// Conjunction of optional predicates. `None` means "don't care" and never fails a match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyConditions {
    pub attestation_status: Option<AttestationStatus>,
    pub debugger: Option<bool>,
    pub hooking: Option<bool>,
    pub proxy_detected: Option<bool>,
    /// Compared against the policy's own `app_version`, not a caller-supplied one.
    pub app_version: Option<String>,
    /// Inclusive lower bound on the risk score.
    pub risk_score_at_least: Option<u32>,
}

impl PolicyConditions {
    pub fn is_empty(&self) -> bool {
        self == &PolicyConditions::default()
    }

    /// True when every present predicate holds.
    pub fn matches(
        &self,
        signals: &IntegritySignals,
        attestation: Option<AttestationStatus>,
        risk_score: u32,
        policy_app_version: &str,
    ) -> bool {
        if let Some(required) = self.attestation_status
            && attestation != Some(required)
        {
            return false;
        }
        if let Some(required) = self.debugger
            && signals.debugger != required
        {
            return false;
        }
        if let Some(required) = self.hooking
            && signals.hooking != required
        {
            return false;
        }
        if let Some(required) = self.proxy_detected
            && signals.proxy_detected != required
        {
            return false;
        }
        if let Some(required) = self.app_version.as_deref()
            && policy_app_version != required
        {
            return false;
        }
        if let Some(threshold) = self.risk_score_at_least
            && risk_score < threshold
        {
            return false;
        }
        true
    }
}

impl Policy {
    /// Rules targeting `action`, in precedence order.
    pub fn rules_for<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a PolicyRule> + 'a {
        self.rules.iter().filter(move |r| r.action == action)
    }
}

impl From<PolicyDocument> for Policy {
    fn from(doc: PolicyDocument) -> Self {
        Self {
            policy_id: doc.policy_id,
            app_id: doc.app_id,
            app_version: doc.app_version,
            env: doc.env,
            rules: doc.rules.into_iter().map(PolicyRule::from).collect(),
            issued_at: doc.issued_at,
        }
    }
}

impl From<RuleDocument> for PolicyRule {
    fn from(rule: RuleDocument) -> Self {
        Self {
            action: rule.action,
            decision: rule.decision,
            conditions: rule.conditions.into(),
        }
    }
}

impl From<ConditionsDocument> for PolicyConditions {
    fn from(c: ConditionsDocument) -> Self {
        Self {
            attestation_status: c.attestation,
            debugger: c.debugger,
            hooking: c.hooking,
            proxy_detected: c.proxy_detected,
            app_version: c.app_version,
            risk_score_at_least: c.risk_score_gte,
        }
    }
}

/// The wire form of a policy. The signature is not part of the model and is left empty.
impl From<&Policy> for PolicyDocument {
    fn from(policy: &Policy) -> Self {
        Self {
            policy_id: policy.policy_id.clone(),
            app_id: policy.app_id.clone(),
            app_version: policy.app_version.clone(),
            env: policy.env.clone(),
            rules: policy.rules.iter().map(RuleDocument::from).collect(),
            signature: None,
            issued_at: policy.issued_at.clone(),
        }
    }
}

impl From<&PolicyRule> for RuleDocument {
    fn from(rule: &PolicyRule) -> Self {
        Self {
            action: rule.action.clone(),
            decision: rule.decision,
            conditions: ConditionsDocument {
                attestation: rule.conditions.attestation_status,
                debugger: rule.conditions.debugger,
                hooking: rule.conditions.hooking,
                proxy_detected: rule.conditions.proxy_detected,
                app_version: rule.conditions.app_version.clone(),
                risk_score_gte: rule.conditions.risk_score_at_least,
            },
        }
    }
}
