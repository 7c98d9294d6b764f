use crate::model::{AppConfig, PinningConfig, RiskConfig, ShieldcoreConfigV1};
use crate::presets;
use anyhow::Context;
use shieldcore_domain::{PinSet, RiskWeights};
use shieldcore_types::SCHEMA_CONFIG_V1;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub env: Option<String>,
}

/// Identity of the app the core runs inside. Stamped on telemetry events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_id: String,
    pub app_version: String,
    pub env: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveConfig {
    pub profile: String,
    pub app: Option<AppIdentity>,
    /// `None` when the config has no `[pinning]` table.
    pub pin_set: Option<PinSet>,
    pub risk_weights: RiskWeights,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: ShieldcoreConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| presets::DEFAULT_PROFILE.to_string());

    let Some(base) = presets::preset(&profile) else {
        anyhow::bail!(
            "unknown profile: {profile} (expected one of: {})",
            presets::PROFILES.join(", ")
        );
    };
    let risk_weights = apply_risk_overrides(base, &cfg.risk);

    let app = cfg
        .app
        .as_ref()
        .map(|a| parse_app(a, overrides.env.as_deref()))
        .transpose()
        .context("invalid [app] table")?;

    let pin_set = cfg
        .pinning
        .as_ref()
        .map(parse_pinning)
        .transpose()
        .context("invalid [pinning] table")?;

    Ok(ResolvedConfig {
        effective: EffectiveConfig {
            profile,
            app,
            pin_set,
            risk_weights,
        },
    })
}

fn apply_risk_overrides(mut w: RiskWeights, risk: &RiskConfig) -> RiskWeights {
    if let Some(v) = risk.jailbreak_or_root {
        w.jailbreak_or_root = v;
    }
    if let Some(v) = risk.debugger_or_hooking {
        w.debugger_or_hooking = v;
    }
    if let Some(v) = risk.proxy_detected {
        w.proxy_detected = v;
    }
    if let Some(v) = risk.attestation_fail {
        w.attestation_fail = v;
    }
    if let Some(v) = risk.per_finding {
        w.per_finding = v;
    }
    w
}

fn parse_app(app: &AppConfig, env_override: Option<&str>) -> anyhow::Result<AppIdentity> {
    let env = env_override.or(app.env.as_deref());
    Ok(AppIdentity {
        app_id: required("app_id", app.app_id.as_deref())?,
        app_version: required("app_version", app.app_version.as_deref())?,
        env: required("env", env)?,
    })
}

fn required(key: &str, value: Option<&str>) -> anyhow::Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => anyhow::bail!("missing or empty key: {key}"),
    }
}

fn parse_pinning(p: &PinningConfig) -> anyhow::Result<PinSet> {
    for hash in p.current.iter().chain(&p.previous) {
        if hash.trim().is_empty() {
            anyhow::bail!("pin hashes must not be empty");
        }
    }

    let mut pins = PinSet::new(p.current.iter().cloned(), p.previous.iter().cloned());
    pins.rotation_window_days = p.rotation_window_days;
    if let Some(ts) = p.rotated_at.as_deref() {
        pins.rotated_at = Some(parse_timestamp(ts)?);
    }
    Ok(pins)
}

fn parse_timestamp(v: &str) -> anyhow::Result<OffsetDateTime> {
    OffsetDateTime::parse(v, &Rfc3339)
        .with_context(|| format!("invalid rotated_at: {v} (expected RFC 3339)"))
}
