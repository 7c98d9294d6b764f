//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{AppConfig, PinningConfig, RiskConfig, ShieldcoreConfigV1};
pub use presets::{DEFAULT_PROFILE, PROFILES};
pub use resolve::{AppIdentity, EffectiveConfig, Overrides, ResolvedConfig};

/// Parse `shieldcore.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ShieldcoreConfigV1> {
    let cfg: ShieldcoreConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config (profile preset + per-weight overrides + pin set).
pub fn resolve_config(
    cfg: ShieldcoreConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
