//! End-to-end tests of the `shieldcore` binary against the fixtures in `tests/fixtures`.
//!
//! Every command runs inside an empty temp dir so a stray `shieldcore.toml` never leaks in.

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use shieldcore_test_util::{
    EVENT_ID_PLACEHOLDER, TIMESTAMP_PLACEHOLDER, fixture_path, normalize_nondeterministic,
};
use std::path::PathBuf;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Sandbox {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("shieldcore").expect("shieldcore binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("SHIELDCORE_LOG");
        cmd
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

fn policy(name: &str) -> String {
    fixture_path(&format!("policies/{name}"))
        .to_string_lossy()
        .into_owned()
}

fn config(name: &str) -> String {
    fixture_path(&format!("config/{name}"))
        .to_string_lossy()
        .into_owned()
}

/// Run and return (exit code, parsed stdout).
fn run_json(cmd: &mut Command) -> (i32, Value) {
    let output = cmd.output().expect("run shieldcore");
    let code = output.status.code().expect("exit code");
    let json = serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (code, json)
}

// =============================================================================
// evaluate
// =============================================================================

#[test]
fn scenario_a_login_with_debugger_steps_up() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("login_debugger.json"),
        "--action",
        "login",
        "--debugger",
        "--risk-score",
        "0",
    ]));
    assert_eq!(code, 3);
    assert_eq!(out["decision"], "STEP_UP");
    assert_eq!(out["reason"], "rule_matched");
    assert_eq!(out["rule_index"], 0);
    assert_eq!(out["origin"], "remote");
    assert_eq!(out["risk_score"], 0);
}

#[test]
fn scenario_b_first_match_wins() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "transfer",
        "--proxy",
        "--risk-score",
        "90",
    ]));
    assert_eq!(code, 2);
    assert_eq!(out["decision"], "DENY");
    assert_eq!(out["rule_index"], 0);
}

#[test]
fn scenario_c_risk_rule_applies_without_proxy() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "transfer",
        "--risk-score",
        "90",
    ]));
    assert_eq!(code, 3);
    assert_eq!(out["decision"], "STEP_UP");
    assert_eq!(out["rule_index"], 1);
}

#[test]
fn ungated_action_is_allowed() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "logout",
        "--jailbreak",
        "--proxy",
    ]));
    assert_eq!(code, 0);
    assert_eq!(out["decision"], "ALLOW");
    assert_eq!(out["reason"], "no_rule_for_action");
    assert!(out.get("rule_index").is_none());
}

#[test]
fn failed_attestation_degrades() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "view_card",
        "--attestation",
        "fail",
    ]));
    assert_eq!(code, 4);
    assert_eq!(out["decision"], "DEGRADE");
}

#[test]
fn computed_risk_score_uses_profile_weights() {
    let sb = Sandbox::new();
    // standard: jailbreak 40 + debugger 30 = 70
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "transfer",
        "--jailbreak",
        "--debugger",
    ]));
    assert_eq!(out["risk_score"], 70);
    assert_eq!(code, 3);

    // standard: jailbreak alone is 40, below the threshold
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "transfer",
        "--jailbreak",
    ]));
    assert_eq!(out["risk_score"], 40);
    assert_eq!(code, 0);

    // strict: jailbreak 60 + one finding 10 = 70
    let (code, out) = run_json(sb.cmd().args([
        "--profile",
        "strict",
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "transfer",
        "--jailbreak",
        "--findings",
        "1",
    ]));
    assert_eq!(out["risk_score"], 70);
    assert_eq!(code, 3);
}

#[test]
fn risk_weight_overrides_come_from_config() {
    let sb = Sandbox::new();
    sb.write("shieldcore.toml", "[risk]\nproxy_detected = 75\n");
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("login_debugger.json"),
        "--action",
        "login",
        "--proxy",
    ]));
    assert_eq!(out["risk_score"], 75);
    assert_eq!(code, 0);
}

#[test]
fn unknown_decision_string_fails_closed_to_deny() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("nonconforming/unknown_decision.json"),
        "--action",
        "export",
    ]));
    assert_eq!(code, 2);
    assert_eq!(out["decision"], "DENY");
}

#[test]
fn missing_remote_policy_uses_bundled_and_reports_it() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        "does-not-exist.json",
        "--bundled",
        &policy("bundled.json"),
        "--action",
        "transfer",
    ]));
    assert_eq!(code, 3);
    assert_eq!(out["origin"], "bundled_fallback");
    assert_eq!(out["policy_id"], "bundled-baseline");
}

#[test]
fn malformed_remote_policy_uses_bundled() {
    let sb = Sandbox::new();
    let (_, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        &policy("nonconforming/unknown_attestation.json"),
        "--bundled",
        &policy("bundled.json"),
        "--action",
        "login",
    ]));
    assert_eq!(out["origin"], "bundled_fallback");
    assert_eq!(out["decision"], "ALLOW");
}

#[test]
fn no_usable_policy_fails_closed() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "evaluate",
        "--policy",
        "does-not-exist.json",
        "--action",
        "transfer",
    ]));
    assert_eq!(code, 1);
    assert_eq!(out["decision"], "DENY");
    assert_eq!(out["reason"], "policy_unavailable");
}

#[test]
fn invalid_attestation_flag_is_a_usage_error() {
    let sb = Sandbox::new();
    sb.cmd()
        .args([
            "evaluate",
            "--policy",
            &policy("transfer.json"),
            "--action",
            "login",
            "--attestation",
            "maybe",
        ])
        .assert()
        .failure()
        .stderr(contains("unknown attestation: maybe"));
}

#[test]
fn unknown_profile_is_an_error() {
    let sb = Sandbox::new();
    sb.cmd()
        .args([
            "--profile",
            "paranoid",
            "evaluate",
            "--policy",
            &policy("transfer.json"),
            "--action",
            "login",
        ])
        .assert()
        .code(1)
        .stderr(contains("unknown profile: paranoid"));
}

#[test]
fn unknown_profile_still_prints_a_deny_outcome() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--profile",
        "paranoid",
        "evaluate",
        "--policy",
        &policy("transfer.json"),
        "--action",
        "login",
    ]));
    assert_eq!(code, 1);
    assert_eq!(out["decision"], "DENY");
    assert_eq!(out["reason"], "configuration_missing");
}

#[test]
fn unreadable_bundled_policy_fails_closed() {
    let sb = Sandbox::new();
    let output = sb
        .cmd()
        .args([
            "evaluate",
            "--policy",
            &policy("transfer.json"),
            "--bundled",
            "no-bundle.json",
            "--action",
            "login",
        ])
        .output()
        .expect("run shieldcore");
    assert_eq!(output.status.code(), Some(1));
    let out: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(out["decision"], "DENY");
    assert_eq!(out["reason"], "configuration_missing");
    assert!(String::from_utf8_lossy(&output.stderr).contains("read bundled policy: no-bundle.json"));
}

// =============================================================================
// pin
// =============================================================================

#[test]
fn scenario_d_previous_pin_without_window_is_rejected() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("pins.toml"),
        "pin",
        "--hash",
        "h2",
    ]));
    assert_eq!(code, 2);
    assert_eq!(out["allowed"], false);
    assert_eq!(out["reason"], "previous_pin_expired");

    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("pins.toml"),
        "pin",
        "--hash",
        "h1",
    ]));
    assert_eq!(code, 0);
    assert_eq!(out["reason"], "current_pin");
}

#[test]
fn scenario_e_empty_pins_disable_pinning() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("pinning_disabled.toml"),
        "pin",
        "--hash",
        "anything",
    ]));
    assert_eq!(code, 0);
    assert_eq!(out["allowed"], true);
    assert_eq!(out["reason"], "pinning_disabled");
}

#[test]
fn rotation_window_is_evaluated_at_given_time() {
    let sb = Sandbox::new();
    let at = |now: &str| {
        run_json(sb.cmd().args([
            "--config",
            &config("rotation.toml"),
            "pin",
            "--hash",
            "h2",
            "--now",
            now,
        ]))
    };

    let (code, out) = at("2026-03-31T00:00:00Z");
    assert_eq!(code, 0);
    assert_eq!(out["reason"], "previous_pin_in_window");

    let (code, out) = at("2026-03-31T00:00:01Z");
    assert_eq!(code, 2);
    assert_eq!(out["reason"], "previous_pin_expired");
}

#[test]
fn pin_without_pinning_config_is_configuration_missing() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args(["pin", "--hash", "h1"]));
    assert_eq!(code, 1);
    assert_eq!(out["allowed"], false);
    assert_eq!(out["reason"], "configuration_missing");
}

#[test]
fn pin_rejects_non_rfc3339_time() {
    let sb = Sandbox::new();
    sb.cmd()
        .args([
            "--config",
            &config("rotation.toml"),
            "pin",
            "--hash",
            "h2",
            "--now",
            "yesterday",
        ])
        .assert()
        .code(1)
        .stdout(contains("malformed_input"))
        .stderr(contains("invalid --now"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["--config", "nope.toml", "pin", "--hash", "h1"])
        .assert()
        .code(1)
        .stderr(contains("read config: nope.toml"));

    let (code, out) = run_json(sb.cmd().args(["--config", "nope.toml", "pin", "--hash", "h1"]));
    assert_eq!(code, 1);
    assert_eq!(out["allowed"], false);
    assert_eq!(out["reason"], "configuration_missing");
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_reports_rules_and_fingerprint() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["validate", "--policy", &policy("transfer.json")])
        .assert()
        .success()
        .stdout(contains("ok: policy transfer-v3 with 3 rule(s)"))
        .stdout(contains("actions: transfer, view_card"))
        .stdout(contains("fingerprint: "));
}

#[test]
fn validate_rejects_unknown_attestation() {
    let sb = Sandbox::new();
    sb.cmd()
        .args([
            "validate",
            "--policy",
            &policy("nonconforming/unknown_attestation.json"),
        ])
        .assert()
        .code(1)
        .stderr(contains("malformed input"));
}

#[test]
fn validate_rejects_empty_rule_action() {
    let sb = Sandbox::new();
    let path = sb.write(
        "empty_action.json",
        r#"{"policy_id":"p","app_id":"a","app_version":"1","env":"prod",
            "issued_at":"2026-01-01T00:00:00Z","rules":[{"action":"","decision":"DENY"}]}"#,
    );
    sb.cmd()
        .args(["validate", "--policy", &path.to_string_lossy()])
        .assert()
        .code(1)
        .stderr(contains("rules[0].action must not be empty"));
}

// =============================================================================
// event
// =============================================================================

#[test]
fn event_is_stamped_with_app_identity() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("app.toml"),
        "--env",
        "staging",
        "event",
        "--action",
        "login",
        "--debugger",
        "--attestation",
        "pass",
        "--provider",
        "app_attest",
    ]));
    assert_eq!(code, 0);

    let normalized = normalize_nondeterministic(out);
    assert_eq!(normalized["event_id"], EVENT_ID_PLACEHOLDER);
    assert_eq!(normalized["timestamp"], TIMESTAMP_PLACEHOLDER);
    assert_eq!(normalized["app_id"], "fintech.mobile");
    assert_eq!(normalized["env"], "staging");
    assert_eq!(normalized["action"]["name"], "login");
    assert_eq!(normalized["signals"]["debugger"], true);
    assert_eq!(normalized["signals"]["proxy_detected"], false);
    assert_eq!(normalized["attestation"]["provider"], "app_attest");
    assert_eq!(normalized["attestation"]["result"], "pass");
    assert!(normalized.get("device").is_none());
}

#[test]
fn events_get_distinct_ids() {
    let sb = Sandbox::new();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let (_, out) = run_json(sb.cmd().args([
            "--config",
            &config("app.toml"),
            "event",
            "--action",
            "login",
        ]));
        ids.push(out["event_id"].as_str().expect("event_id").to_string());
    }
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn event_carries_signature_verbatim() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("app.toml"),
        "event",
        "--action",
        "transfer",
        "--signature",
        "ed25519:q0xZ/9==",
    ]));
    assert_eq!(code, 0);
    assert_eq!(out["signature"], "ed25519:q0xZ/9==");
}

#[test]
fn event_with_blank_action_is_malformed_input() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args([
        "--config",
        &config("app.toml"),
        "event",
        "--action",
        " ",
    ]));
    assert_eq!(code, 1);
    assert_eq!(out["reason"], "malformed_input");
}

#[test]
fn event_without_app_config_is_configuration_missing() {
    let sb = Sandbox::new();
    let (code, out) = run_json(sb.cmd().args(["event", "--action", "login"]));
    assert_eq!(code, 1);
    assert_eq!(out["reason"], "configuration_missing");
}

// =============================================================================
// explain
// =============================================================================

#[test]
fn explain_known_code() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["explain", "bundled_fallback"])
        .assert()
        .success()
        .stdout(contains("Remediation"));
}

#[test]
fn explain_unknown_code_lists_codes() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["explain", "nope"])
        .assert()
        .code(1)
        .stderr(contains("Unknown code: nope"))
        .stderr(contains("previous_pin_in_window"));
}
