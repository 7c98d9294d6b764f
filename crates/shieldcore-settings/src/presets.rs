use shieldcore_domain::RiskWeights;

pub const DEFAULT_PROFILE: &str = "standard";

pub const PROFILES: &[&str] = &["standard", "strict"];

/// Preset risk weights per profile.
///
/// Keep these small and readable. Anything app-specific goes into the `[risk]` table.
pub fn preset(profile: &str) -> Option<RiskWeights> {
    match profile {
        "standard" => Some(standard_profile()),
        "strict" => Some(strict_profile()),
        _ => None,
    }
}

fn standard_profile() -> RiskWeights {
    RiskWeights::default()
}

fn strict_profile() -> RiskWeights {
    // Any single compromise signal on its own crosses a typical step-up threshold of 50.
    RiskWeights {
        jailbreak_or_root: 60,
        debugger_or_hooking: 50,
        proxy_detected: 50,
        attestation_fail: 60,
        per_finding: 10,
    }
}
