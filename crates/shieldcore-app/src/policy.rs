//! The policy loading use case: remote document first, bundled document as fallback.

use crate::error::CoreError;
use crate::ports::{FetchError, PolicyFetcher, PolicyQuery};
use shieldcore_domain::Policy;
use shieldcore_types::ids;
use std::collections::BTreeSet;

/// Where the policy in use came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyOrigin {
    Remote,
    /// The remote document could not be used; `reason` says why.
    BundledFallback { reason: String },
}

impl PolicyOrigin {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyOrigin::Remote => ids::ORIGIN_REMOTE,
            PolicyOrigin::BundledFallback { .. } => ids::ORIGIN_BUNDLED_FALLBACK,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadedPolicy {
    pub policy: Policy,
    pub origin: PolicyOrigin,
    /// SHA-256 of the unsigned document; identifies the policy in logs.
    pub fingerprint: String,
}

/// Parse and validate a policy document.
pub fn parse_policy(json: &str) -> Result<Policy, CoreError> {
    parse_with_fingerprint(json).map(|(policy, _)| policy)
}

/// What `validate` reports about a well-formed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySummary {
    pub policy_id: String,
    pub rule_count: usize,
    /// Distinct actions the policy gates, sorted.
    pub actions: BTreeSet<String>,
    pub fingerprint: String,
}

/// Parse and validate a policy document without evaluating it.
pub fn summarize_policy(json: &str) -> Result<PolicySummary, CoreError> {
    let (policy, fingerprint) = parse_with_fingerprint(json)?;
    Ok(PolicySummary {
        actions: policy.rules.iter().map(|r| r.action.clone()).collect(),
        rule_count: policy.rules.len(),
        policy_id: policy.policy_id,
        fingerprint,
    })
}

fn parse_with_fingerprint(json: &str) -> Result<(Policy, String), CoreError> {
    let doc = shieldcore_types::parse_policy_json(json)?;
    let fingerprint = shieldcore_types::policy_fingerprint(&doc);
    Ok((Policy::from(doc), fingerprint))
}

/// Fetch through the host's fetcher, falling back to `bundled`.
pub fn load_policy(
    fetcher: &dyn PolicyFetcher,
    query: &PolicyQuery,
    bundled: Option<&str>,
) -> Result<LoadedPolicy, CoreError> {
    load_policy_text(fetcher.fetch(query), bundled)
}

/// Resolve a policy from an already-attempted remote fetch and an optional bundled document.
///
/// A remote document that fails to fetch or parse falls back to `bundled`. The origin records
/// the fallback; it never claims the remote fetch succeeded.
pub fn load_policy_text(
    remote: Result<String, FetchError>,
    bundled: Option<&str>,
) -> Result<LoadedPolicy, CoreError> {
    let remote_failure = match remote.map_err(|e| e.to_string()) {
        Ok(text) => match parse_with_fingerprint(&text) {
            Ok((policy, fingerprint)) => {
                return Ok(loaded(policy, PolicyOrigin::Remote, fingerprint));
            }
            Err(err) => err.to_string(),
        },
        Err(err) => err,
    };

    let Some(bundled) = bundled else {
        tracing::warn!(reason = %remote_failure, "remote policy unusable and no bundled policy");
        return Err(CoreError::PolicyUnavailable(remote_failure));
    };

    match parse_with_fingerprint(bundled) {
        Ok((policy, fingerprint)) => {
            tracing::warn!(reason = %remote_failure, "using bundled policy");
            let origin = PolicyOrigin::BundledFallback {
                reason: remote_failure,
            };
            Ok(loaded(policy, origin, fingerprint))
        }
        Err(err) => {
            tracing::warn!(reason = %remote_failure, bundled_error = %err, "no usable policy");
            Err(CoreError::PolicyUnavailable(format!(
                "{remote_failure}; bundled policy rejected: {err}"
            )))
        }
    }
}

fn loaded(policy: Policy, origin: PolicyOrigin, fingerprint: String) -> LoadedPolicy {
    tracing::debug!(
        policy_id = %policy.policy_id,
        origin = origin.code(),
        fingerprint = %fingerprint,
        rules = policy.rules.len(),
        "policy loaded"
    );
    LoadedPolicy {
        policy,
        origin,
        fingerprint,
    }
}
