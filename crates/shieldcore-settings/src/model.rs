use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `shieldcore.toml` schema v1.
///
/// User-facing and permissive: every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShieldcoreConfigV1 {
    /// Optional schema string for tooling (`shieldcore.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Risk weight preset: `standard` (default) or `strict`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppConfig>,

    /// Absent means no pin configuration was provided (not the same as empty pin lists).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinning: Option<PinningConfig>,

    #[serde(default)]
    pub risk: RiskConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Deployment environment, e.g. `prod` or `staging`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PinningConfig {
    /// Base64 SPKI SHA-256 hashes trusted now.
    #[serde(default)]
    pub current: Vec<String>,

    /// Hashes retired by the last rotation.
    #[serde(default)]
    pub previous: Vec<String>,

    /// RFC 3339 timestamp of the last rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotated_at: Option<String>,

    /// Days after `rotated_at` during which `previous` hashes are still accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_window_days: Option<i32>,
}

/// Per-weight overrides on top of the profile preset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jailbreak_or_root: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger_or_hooking: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_detected: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_fail: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_finding: Option<u32>,
}
