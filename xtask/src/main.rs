//! Developer tasks (schema generation, fixture conformance, C header checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(manifest_dir)
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn ffi_dir() -> PathBuf {
    project_root().join("crates").join("shieldcore-ffi")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_policy_schema() -> schemars::Schema {
    schema_for!(shieldcore_types::PolicyDocument)
}

fn generate_telemetry_schema() -> schemars::Schema {
    schema_for!(shieldcore_types::TelemetryEvent)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(shieldcore_settings::ShieldcoreConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "shieldcore.policy.v1.json",
            generate: generate_policy_schema,
        },
        SchemaSpec {
            filename: "shieldcore.telemetry.v1.json",
            generate: generate_telemetry_schema,
        },
        SchemaSpec {
            filename: "shieldcore.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn compile(schema: &schemars::Schema) -> anyhow::Result<jsonschema::Validator> {
    let value = serde_json::to_value(schema).context("Failed to serialize schema")?;
    jsonschema::validator_for(&value).map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

/// Emit schemas to the schemas/ directory.
fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate policy and config fixtures against their schemas");
    eprintln!("  explain-coverage  Validate all reason codes have explanations");
    eprintln!("  check-header      Check include/shieldcore.h against the exported C symbols");
}

/// Fixture files directly under `tests/fixtures/<dir>` with the given extension.
///
/// Subdirectories hold deliberately nonconforming documents and are skipped.
fn fixture_files(dir: &str, ext: &str) -> anyhow::Result<Vec<PathBuf>> {
    let root = shieldcore_test_util::fixtures_dir().join(dir);
    let mut files = Vec::new();
    for entry in WalkDir::new(&root).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        let path = entry.into_path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Validate fixtures against the generated schemas and run them through the parsers.
fn conform() -> anyhow::Result<()> {
    let policy_schema = compile(&generate_policy_schema())?;
    let config_schema = compile(&generate_config_schema())?;
    println!("✓ schemas compile");

    let mut errors = Vec::new();
    let mut count = 0;

    for path in fixture_files("policies", "json")? {
        let name = file_label(&path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {name} as JSON"))?;

        for err in policy_schema.iter_errors(&value) {
            errors.push(format!("{name}: schema validation: {err}"));
        }
        if let Err(err) = shieldcore_types::parse_policy_json(&text) {
            errors.push(format!("{name}: parser rejected: {err}"));
        }
        count += 1;
        println!("  ✓ {name} validates");
    }

    for path in fixture_files("config", "toml")? {
        let name = file_label(&path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let as_toml: toml::Value =
            toml::from_str(&text).with_context(|| format!("Failed to parse {name} as TOML"))?;
        let value = serde_json::to_value(&as_toml)?;

        for err in config_schema.iter_errors(&value) {
            errors.push(format!("{name}: schema validation: {err}"));
        }
        let resolved = shieldcore_settings::parse_config_toml(&text).and_then(|cfg| {
            shieldcore_settings::resolve_config(cfg, shieldcore_settings::Overrides::default())
        });
        if let Err(err) = resolved {
            errors.push(format!("{name}: does not resolve: {err:#}"));
        }
        count += 1;
        println!("  ✓ {name} validates");
    }

    if count == 0 {
        bail!(
            "No fixtures found in {}",
            shieldcore_test_util::fixtures_dir().display()
        );
    }

    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {count} fixtures pass conformance checks!");
    Ok(())
}

/// Validate that all reason codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    let codes = shieldcore_types::explain::all_codes();
    let mut errors = Vec::new();

    for code in codes {
        match shieldcore_types::explain::lookup_explanation(code) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("Code '{code}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("Code '{code}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("Code '{code}' has empty remediation"));
                }
            }
            None => errors.push(format!("Code '{code}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} codes have explanations", codes.len());
        println!("\n✓ All explain coverage checks passed!");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!(
            "Explain coverage validation failed with {} errors",
            errors.len()
        )
    }
}

/// Names of `extern "C"` functions declared in a Rust source file.
fn exported_symbols(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let rest = line.trim().split_once("extern \"C\" fn ")?.1;
            let name: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

/// `pub const NAME: ty = value;` pairs from the FFI codes module.
fn exported_codes(source: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("pub const ")?;
            let (name, rest) = rest.split_once(':')?;
            let value = rest.split_once('=')?.1.trim().trim_end_matches(';').trim();
            Some((name.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Check that every exported symbol and code constant appears in the C header with the same value.
fn check_header() -> anyhow::Result<()> {
    let dir = ffi_dir();
    let lib = fs::read_to_string(dir.join("src").join("lib.rs")).context("Failed to read ffi lib.rs")?;
    let codes =
        fs::read_to_string(dir.join("src").join("codes.rs")).context("Failed to read ffi codes.rs")?;
    let header = fs::read_to_string(dir.join("include").join("shieldcore.h"))
        .context("Failed to read include/shieldcore.h")?;

    let mut errors = Vec::new();

    let symbols = exported_symbols(&lib);
    if symbols.is_empty() {
        bail!("No extern \"C\" functions found in shieldcore-ffi");
    }
    for symbol in &symbols {
        if !header.contains(&format!("{symbol}(")) {
            errors.push(format!("symbol '{symbol}' is not declared in shieldcore.h"));
        }
    }

    let constants = exported_codes(&codes);
    for (name, value) in &constants {
        let define = format!("SHIELD_{name}");
        let declared = header.lines().find_map(|line| {
            let rest = line.trim().strip_prefix("#define ")?;
            let (n, v) = rest.split_once(char::is_whitespace)?;
            (n == define).then(|| v.trim().trim_matches(|c| c == '(' || c == ')').to_string())
        });
        match declared {
            // Pin verdicts are documented as plain 0/1 in the header.
            None if name.starts_with("PIN_") => {}
            None => errors.push(format!("{define} is not defined in shieldcore.h")),
            Some(v) if v != *value => {
                errors.push(format!("{define} is {v} in shieldcore.h but {value} in codes.rs"))
            }
            Some(_) => {}
        }
    }

    if !errors.is_empty() {
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Header check failed with {} errors", errors.len());
    }

    println!("✓ {} symbols declared in shieldcore.h", symbols.len());
    println!("✓ {} code constants match", constants.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "check-header" => check_header(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
