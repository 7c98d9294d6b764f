use anyhow::Context;
use shieldcore_settings::{Overrides, ResolvedConfig, ShieldcoreConfigV1};

/// Parse and resolve config text. Empty text means defaults.
pub fn load_config(config_text: &str, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        ShieldcoreConfigV1::default()
    } else {
        shieldcore_settings::parse_config_toml(config_text).context("parse config")?
    };

    shieldcore_settings::resolve_config(cfg, overrides).context("resolve config")
}
