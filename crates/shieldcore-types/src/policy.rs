//! Policy document wire shape, as served by the policy service or bundled with the app.

use crate::{AttestationStatus, Decision};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning bytes into a [`PolicyDocument`].
#[derive(Debug, Error)]
pub enum WireError {
    #[error("policy document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("policy document failed validation: {0}")]
    Invalid(String),
}

/// `shieldcore.policy.v1`.
///
/// `rules` order is precedence and is never re-sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyDocument {
    pub policy_id: String,
    pub app_id: String,
    pub app_version: String,
    pub env: String,
    pub rules: Vec<RuleDocument>,

    /// Carried verbatim for the host; shieldcore never verifies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    pub issued_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    pub action: String,
    pub decision: Decision,
    /// Omitted and `null` both mean no conditions.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "ConditionsDocument::is_empty"
    )]
    #[schemars(with = "Option<ConditionsDocument>")]
    pub conditions: ConditionsDocument,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<ConditionsDocument, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ConditionsDocument>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sparse predicate set. A missing key means "don't care".
///
/// Unknown keys are rejected so that a predicate this build does not understand can never be
/// silently dropped from a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConditionsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score_gte: Option<u32>,
}

impl ConditionsDocument {
    pub fn is_empty(&self) -> bool {
        self == &ConditionsDocument::default()
    }
}

/// Parse and validate a policy document.
pub fn parse_policy_json(input: &str) -> Result<PolicyDocument, WireError> {
    let doc: PolicyDocument = serde_json::from_str(input)?;
    validate_policy(&doc)?;
    Ok(doc)
}

/// Structural checks that serde cannot express.
///
/// An empty rule list is valid: it allows every action.
pub fn validate_policy(doc: &PolicyDocument) -> Result<(), WireError> {
    validate_non_empty("policy_id", &doc.policy_id)?;
    validate_non_empty("app_id", &doc.app_id)?;
    validate_non_empty("app_version", &doc.app_version)?;
    validate_non_empty("env", &doc.env)?;
    validate_non_empty("issued_at", &doc.issued_at)?;
    for (idx, rule) in doc.rules.iter().enumerate() {
        validate_non_empty(&format!("rules[{idx}].action"), &rule.action)?;
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), WireError> {
    if value.trim().is_empty() {
        return Err(WireError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}
