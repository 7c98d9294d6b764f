use crate::PolicyDocument;
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a policy document.
///
/// Identity is the document content minus `signature`, serialized in field order with absent
/// predicates omitted. Two documents differing only in their signature share a fingerprint.
/// This identifies a policy in logs and telemetry; it is not an integrity check.
pub fn policy_fingerprint(doc: &PolicyDocument) -> String {
    let unsigned = PolicyDocument {
        signature: None,
        ..doc.clone()
    };
    let canonical = serde_json::to_vec(&unsigned).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();
    hex::encode(digest)
}
