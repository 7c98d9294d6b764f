//! CLI entry point for shieldcore.
//!
//! This module is thin: it handles argument parsing, file and clock access, and exit codes.
//! All decision logic lives in the `shieldcore-app` and `shieldcore-domain` crates.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use shieldcore_app::{
    CoreError, DecideInput, EventInput, ExplainOutput, FetchError, build_event, check_pin, decide,
    decision_exit_code, load_config, load_policy_text, pin_exit_code, run_explain,
    summarize_policy,
};
use shieldcore_domain::{AttestationStatus, DecisionReason, IntegritySignals};
use shieldcore_settings::{Overrides, ResolvedConfig};
use shieldcore_types::{ActionContext, AttestationProvider, AttestationReport};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const DEFAULT_CONFIG: &str = "shieldcore.toml";

#[derive(Parser, Debug)]
#[command(
    name = "shieldcore",
    version,
    about = "Runtime security decisions: policy evaluation and certificate pin checks"
)]
struct Cli {
    /// Path to shieldcore config TOML (default: ./shieldcore.toml if present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Override risk profile (standard|strict).
    #[arg(long)]
    profile: Option<String>,

    /// Override the app environment from [app].
    #[arg(long)]
    env: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether an action is allowed under a policy document.
    Evaluate {
        /// Policy document JSON (the remotely fetched copy).
        #[arg(long)]
        policy: Utf8PathBuf,

        /// Bundled policy JSON used when the primary document is unusable.
        #[arg(long)]
        bundled: Option<Utf8PathBuf>,

        /// Action to decide, e.g. `login` or `transfer`.
        #[arg(long)]
        action: String,

        #[command(flatten)]
        signals: SignalArgs,

        /// Attestation result (pass|fail|unknown). Omit when no attestation was performed.
        #[arg(long, value_parser = parse_attestation)]
        attestation: Option<AttestationStatus>,

        /// Risk score supplied by the host. Computed from the signals when omitted.
        #[arg(long)]
        risk_score: Option<u32>,

        /// Extra host findings counted into a computed risk score.
        #[arg(long, default_value_t = 0)]
        findings: usize,
    },

    /// Check a presented SPKI hash against the configured pins.
    Pin {
        /// Base64 SHA-256 of the server's SubjectPublicKeyInfo.
        #[arg(long)]
        hash: String,

        /// Evaluation time (RFC 3339). Defaults to the current time.
        #[arg(long)]
        now: Option<String>,
    },

    /// Parse and validate a policy document.
    Validate {
        #[arg(long)]
        policy: Utf8PathBuf,
    },

    /// Print a telemetry event for the configured app.
    Event {
        #[arg(long)]
        action: String,

        /// Free-form action context.
        #[arg(long)]
        context: Option<String>,

        #[command(flatten)]
        signals: SignalArgs,

        #[arg(long, value_parser = parse_attestation)]
        attestation: Option<AttestationStatus>,

        /// Attestation provider (app_attest|play_integrity|none).
        #[arg(long, value_parser = parse_provider, default_value = "none")]
        provider: AttestationProvider,

        /// Host-computed event signature, copied into the event as given.
        #[arg(long)]
        signature: Option<String>,
    },

    /// Explain a reason code.
    Explain {
        /// The code to explain, e.g. `previous_pin_in_window`.
        code: String,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct SignalArgs {
    #[arg(long)]
    jailbreak: bool,
    #[arg(long)]
    root: bool,
    #[arg(long)]
    debugger: bool,
    #[arg(long)]
    hooking: bool,
    /// An intercepting proxy was detected.
    #[arg(long)]
    proxy: bool,
}

impl From<SignalArgs> for IntegritySignals {
    fn from(a: SignalArgs) -> Self {
        IntegritySignals {
            jailbreak: a.jailbreak,
            root: a.root,
            debugger: a.debugger,
            hooking: a.hooking,
            proxy_detected: a.proxy,
        }
    }
}

fn parse_attestation(v: &str) -> Result<AttestationStatus, String> {
    AttestationStatus::from_wire(v)
        .ok_or_else(|| format!("unknown attestation: {v} (expected pass|fail|unknown)"))
}

fn parse_provider(v: &str) -> Result<AttestationProvider, String> {
    match v {
        "app_attest" => Ok(AttestationProvider::AppAttest),
        "play_integrity" => Ok(AttestationProvider::PlayIntegrity),
        "none" => Ok(AttestationProvider::None),
        other => Err(format!(
            "unknown provider: {other} (expected app_attest|play_integrity|none)"
        )),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.cmd {
        Commands::Evaluate {
            policy,
            bundled,
            action,
            signals,
            attestation,
            risk_score,
            findings,
        } => cmd_evaluate(
            &cli,
            policy,
            bundled.as_deref(),
            action,
            (*signals).into(),
            *attestation,
            *risk_score,
            *findings,
        ),
        Commands::Pin { hash, now } => cmd_pin(&cli, hash, now.as_deref()),
        Commands::Validate { policy } => cmd_validate(policy),
        Commands::Event {
            action,
            context,
            signals,
            attestation,
            provider,
            signature,
        } => cmd_event(
            &cli,
            action,
            context.clone(),
            (*signals).into(),
            *attestation,
            *provider,
            signature.clone(),
        ),
        Commands::Explain { code } => cmd_explain(code),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env("SHIELDCORE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> anyhow::Result<ResolvedConfig> {
    let text = match &cli.config {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read config: {path}"))?
        }
        // Missing default config is allowed (defaults apply).
        None => std::fs::read_to_string(DEFAULT_CONFIG).unwrap_or_default(),
    };

    let overrides = Overrides {
        profile: cli.profile.clone(),
        env: cli.env.clone(),
    };
    let resolved = load_config(&text, overrides)?;
    tracing::debug!(profile = %resolved.effective.profile, "config resolved");
    Ok(resolved)
}

/// Print the fail-closed outcome for `err` and exit with status 1.
fn exit_with(err: &CoreError, outcome: serde_json::Value) -> ! {
    println!("{outcome:#}");
    eprintln!("shieldcore error: {err}");
    std::process::exit(1);
}

/// Resolve settings, or exit through `exit_with` with the command's fail-closed outcome.
fn settings_or_exit(cli: &Cli, outcome: fn(&CoreError) -> serde_json::Value) -> ResolvedConfig {
    match load_settings(cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            let err = CoreError::ConfigurationMissing(format!("{e:#}"));
            exit_with(&err, outcome(&err))
        }
    }
}

fn deny_outcome(err: &CoreError) -> serde_json::Value {
    json!({ "decision": err.fail_closed().as_wire(), "reason": err.code() })
}

fn pin_outcome(err: &CoreError) -> serde_json::Value {
    json!({ "allowed": false, "reason": err.code() })
}

fn reason_outcome(err: &CoreError) -> serde_json::Value {
    json!({ "reason": err.code() })
}

#[allow(clippy::too_many_arguments)]
fn cmd_evaluate(
    cli: &Cli,
    policy_path: &Utf8Path,
    bundled_path: Option<&Utf8Path>,
    action: &str,
    signals: IntegritySignals,
    attestation: Option<AttestationStatus>,
    risk_score: Option<u32>,
    findings: usize,
) -> anyhow::Result<()> {
    let resolved = settings_or_exit(cli, deny_outcome);

    let remote = std::fs::read_to_string(policy_path)
        .map_err(|e| FetchError(format!("read {policy_path}: {e}")));
    let bundled = match bundled_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                let err =
                    CoreError::ConfigurationMissing(format!("read bundled policy: {path}: {e}"));
                exit_with(&err, deny_outcome(&err))
            }
        },
        None => None,
    };

    let loaded = match load_policy_text(remote, bundled.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => exit_with(&err, deny_outcome(&err)),
    };

    let out = decide(&DecideInput {
        policy: &loaded.policy,
        action,
        signals,
        attestation,
        risk_score,
        finding_count: findings,
        weights: resolved.effective.risk_weights,
    });

    let mut report = json!({
        "decision": out.decision.as_wire(),
        "reason": out.reason.code(),
        "origin": loaded.origin.code(),
        "risk_score": out.risk_score,
        "policy_id": loaded.policy.policy_id,
        "fingerprint": loaded.fingerprint,
    });
    if let DecisionReason::RuleMatched { index } = out.reason {
        report["rule_index"] = json!(index);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    let code = decision_exit_code(out.decision);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn cmd_pin(cli: &Cli, hash: &str, now: Option<&str>) -> anyhow::Result<()> {
    let resolved = settings_or_exit(cli, pin_outcome);

    let now = match now {
        Some(ts) => match OffsetDateTime::parse(ts, &Rfc3339) {
            Ok(now) => now,
            Err(_) => {
                let err =
                    CoreError::MalformedInput(format!("invalid --now: {ts} (expected RFC 3339)"));
                exit_with(&err, pin_outcome(&err))
            }
        },
        None => OffsetDateTime::now_utc(),
    };

    let verdict = match check_pin(resolved.effective.pin_set.as_ref(), hash, now) {
        Ok(verdict) => verdict,
        Err(err) => exit_with(&err, pin_outcome(&err)),
    };

    let report = json!({ "allowed": verdict.is_allowed(), "reason": verdict.code() });
    println!("{}", serde_json::to_string_pretty(&report)?);

    let code = pin_exit_code(verdict);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn cmd_validate(policy_path: &Utf8Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(policy_path)
        .with_context(|| format!("read policy: {policy_path}"))?;

    match summarize_policy(&text) {
        Ok(summary) => {
            println!(
                "ok: policy {} with {} rule(s)",
                summary.policy_id, summary.rule_count
            );
            let actions: Vec<&str> = summary.actions.iter().map(String::as_str).collect();
            println!("actions: {}", actions.join(", "));
            println!("fingerprint: {}", summary.fingerprint);
            Ok(())
        }
        Err(err) => {
            eprintln!("shieldcore error: {err}");
            std::process::exit(1);
        }
    }
}

fn cmd_event(
    cli: &Cli,
    action: &str,
    context: Option<String>,
    signals: IntegritySignals,
    attestation: Option<AttestationStatus>,
    provider: AttestationProvider,
    signature: Option<String>,
) -> anyhow::Result<()> {
    let resolved = settings_or_exit(cli, reason_outcome);
    let Some(app) = resolved.effective.app.as_ref() else {
        let err = CoreError::ConfigurationMissing("[app] table".to_string());
        exit_with(&err, reason_outcome(&err));
    };

    let input = EventInput {
        action: ActionContext {
            name: action.to_string(),
            context,
        },
        signals,
        attestation: attestation.map(|result| AttestationReport {
            provider,
            result,
            timestamp: None,
        }),
        device: None,
        session: None,
        signature,
    };

    let event = match build_event(app, input, OffsetDateTime::now_utc()) {
        Ok(event) => event,
        Err(err) => exit_with(&err, reason_outcome(&err)),
    };
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

fn cmd_explain(code: &str) -> anyhow::Result<()> {
    match run_explain(code) {
        ExplainOutput::Found(exp) => {
            print!("{}", shieldcore_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_codes,
        } => {
            eprint!(
                "{}",
                shieldcore_app::format_not_found(&identifier, available_codes)
            );
            std::process::exit(1);
        }
    }
}
