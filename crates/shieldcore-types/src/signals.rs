use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// The only outcomes a caller may receive.
///
/// Variant order carries no severity; every variant is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    StepUp,
    Degrade,
    Deny,
}

impl Decision {
    pub const ALL: [Decision; 4] = [
        Decision::Allow,
        Decision::StepUp,
        Decision::Degrade,
        Decision::Deny,
    ];

    /// Map a wire string (`ALLOW|STEP_UP|DEGRADE|DENY`, ASCII case-insensitive) to a decision.
    ///
    /// This is the one place decision strings are interpreted. Anything outside the closed
    /// set is `Deny`.
    pub fn from_wire(value: &str) -> Decision {
        match value.to_ascii_uppercase().as_str() {
            "ALLOW" => Decision::Allow,
            "STEP_UP" => Decision::StepUp,
            "DEGRADE" => Decision::Degrade,
            "DENY" => Decision::Deny,
            _ => Decision::Deny,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::StepUp => "STEP_UP",
            Decision::Degrade => "DEGRADE",
            Decision::Deny => "DENY",
        }
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Decision::from_wire(&raw))
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Attestation verdict as reported by the platform provider.
///
/// "No attestation available" is `Option::None` at every call site, never `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttestationStatus {
    Unknown,
    Pass,
    Fail,
}

impl AttestationStatus {
    /// Map `pass|fail|unknown` (ASCII case-insensitive). Unrecognized strings are `None`.
    pub fn from_wire(value: &str) -> Option<AttestationStatus> {
        match value.to_ascii_lowercase().as_str() {
            "unknown" => Some(AttestationStatus::Unknown),
            "pass" => Some(AttestationStatus::Pass),
            "fail" => Some(AttestationStatus::Fail),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            AttestationStatus::Unknown => "unknown",
            AttestationStatus::Pass => "pass",
            AttestationStatus::Fail => "fail",
        }
    }
}

impl<'de> Deserialize<'de> for AttestationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AttestationStatus::from_wire(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown attestation status: {raw} (expected pass|fail|unknown)"
            ))
        })
    }
}

impl std::fmt::Display for AttestationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Caller-observed device integrity facts. Opaque to the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct IntegritySignals {
    pub jailbreak: bool,
    pub root: bool,
    pub debugger: bool,
    pub hooking: bool,
    pub proxy_detected: bool,
}
